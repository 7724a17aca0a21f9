//! TwiML reply documents for RingStack.
//!
//! A webhook receiver answers a provider callback with an XML document that
//! tells the provider what to do next: send a message, fetch another
//! document, and so on. Each instruction is a *verb*.
//!
//! ```rust
//! use ringstack_twiml::{Message, Response};
//!
//! let mut response = Response::new();
//! response.message(Message {
//!     body: "Thanks, we got it".to_owned(),
//!     ..Message::default()
//! });
//!
//! let xml = String::from_utf8(response.to_xml().unwrap()).unwrap();
//! assert!(xml.contains("<Message method=\"POST\"><Body>Thanks, we got it</Body></Message>"));
//! ```
//!
//! # Document conventions
//!
//! - XML declaration: `<?xml version="1.0" encoding="UTF-8"?>`
//! - Root element: `<Response>`
//! - Verbs are written in the order they were added
//! - Every verb carries a `method` attribute, defaulting to `POST`

pub mod error;
pub mod response;
pub mod verb;

pub use error::TwimlError;
pub use response::Response;
pub use verb::{Message, Redirect, Verb};
