//! TwiML verbs and their XML encoding.

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::BytesText;

/// HTTP method used when a verb does not name one.
pub const DEFAULT_METHOD: &str = "POST";

/// A single instruction inside a `<Response>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// Send a message.
    Message(Message),
    /// Fetch another document and continue with it.
    Redirect(Redirect),
}

impl Verb {
    /// The element name of this verb.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Message(_) => "Message",
            Self::Redirect(_) => "Redirect",
        }
    }

    pub(crate) fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        match self {
            Self::Message(message) => message.write_xml(writer),
            Self::Redirect(redirect) => redirect.write_xml(writer),
        }
    }
}

/// The `<Message>` verb.
///
/// Empty strings mean "not set": the optional attributes and the `<Body>` and
/// `<Media>` children are left out of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Destination number (`to` attribute).
    pub to: String,
    /// Sender number (`from` attribute).
    pub from: String,
    /// URL the provider requests after sending (`action` attribute).
    pub action: String,
    /// Method for `action`; `POST` when empty.
    pub method: String,
    /// URL for delivery status callbacks (`statusCallback` attribute).
    pub status_callback: String,
    /// Message text.
    pub body: String,
    /// Media URL.
    pub media: String,
}

impl Message {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        let mut element = writer.create_element("Message");
        for (name, value) in [
            ("to", self.to.as_str()),
            ("from", self.from.as_str()),
            ("action", self.action.as_str()),
        ] {
            if !value.is_empty() {
                element = element.with_attribute((name, value));
            }
        }
        element = element.with_attribute(("method", method_or_default(&self.method)));
        if !self.status_callback.is_empty() {
            element = element.with_attribute(("statusCallback", self.status_callback.as_str()));
        }

        if self.body.is_empty() && self.media.is_empty() {
            element.write_empty()?;
            return Ok(());
        }

        element.write_inner_content(|w| {
            write_optional_text(w, "Body", &self.body)?;
            write_optional_text(w, "Media", &self.media)
        })?;
        Ok(())
    }
}

/// The `<Redirect>` verb: `<Redirect method="POST">url</Redirect>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redirect {
    /// Document URL to continue with.
    pub url: String,
    /// Method used to fetch `url`; `POST` when empty.
    pub method: String,
}

impl Redirect {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer
            .create_element("Redirect")
            .with_attribute(("method", method_or_default(&self.method)))
            .write_text_content(BytesText::new(&self.url))?;
        Ok(())
    }
}

fn method_or_default(method: &str) -> &str {
    if method.is_empty() {
        DEFAULT_METHOD
    } else {
        method
    }
}

/// Write `<tag>text</tag>` unless `text` is empty.
fn write_optional_text<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    if !text.is_empty() {
        writer
            .create_element(tag)
            .write_text_content(BytesText::new(text))?;
    }
    Ok(())
}
