//! The `<Response>` document root.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, Event};

use crate::error::TwimlError;
use crate::verb::{Message, Redirect, Verb};

/// Root element name of every TwiML document.
pub const ROOT_ELEMENT: &str = "Response";

/// A TwiML document: an ordered list of verbs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    verbs: Vec<Verb>,
}

impl Response {
    /// Create an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `<Message>` verb.
    pub fn message(&mut self, message: Message) -> &mut Self {
        self.verbs.push(Verb::Message(message));
        self
    }

    /// Append a `<Redirect>` verb.
    pub fn redirect(&mut self, redirect: Redirect) -> &mut Self {
        self.verbs.push(Verb::Redirect(redirect));
        self
    }

    /// The verbs in document order.
    #[must_use]
    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    /// Serialize the document into a new buffer.
    ///
    /// # Errors
    ///
    /// Returns [`TwimlError`] if serialization fails.
    pub fn to_xml(&self) -> Result<Vec<u8>, TwimlError> {
        let mut buf = Vec::with_capacity(128 + self.verbs.len() * 64);
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Serialize the document, with its XML declaration, into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`TwimlError`] if writing to `out` fails.
    pub fn write_to<W: Write>(&self, out: W) -> Result<(), TwimlError> {
        let mut writer = Writer::new(out);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let root = writer.create_element(ROOT_ELEMENT);
        if self.verbs.is_empty() {
            root.write_empty()?;
        } else {
            root.write_inner_content(|w| {
                for verb in &self.verbs {
                    verb.write_xml(w)?;
                }
                Ok(())
            })?;
        }

        tracing::trace!(verbs = self.verbs.len(), "serialized TwiML response");
        Ok(())
    }
}
