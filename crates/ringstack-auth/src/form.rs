//! Multi-valued form parameters and strict `application/x-www-form-urlencoded`
//! body parsing.
//!
//! Providers post callback data as URL-encoded forms. A field may repeat, and
//! the order of its values matters for the signature, so [`FormParams`] keeps
//! every value in submission order. Keys are held in a [`BTreeMap`], which
//! iterates them in ascending byte-wise order.
//!
//! Names and values are kept as the raw bytes their escapes decode to. A
//! provider may sign a value that is not UTF-8, and that value has to reach
//! the HMAC unchanged.

use std::collections::BTreeMap;
use std::collections::btree_map;

use percent_encoding::percent_decode;

use crate::error::AuthError;

/// Largest form body accepted for parsing (10 MiB).
pub const MAX_FORM_BODY_BYTES: usize = 10 << 20;

/// A multi-valued mapping from field name to its values in submission order.
///
/// # Examples
///
/// ```
/// use ringstack_auth::FormParams;
///
/// let mut form = FormParams::new();
/// form.insert("To", "+15550001111");
/// form.insert("Media", "a.png");
/// form.insert("Media", "b.png");
///
/// assert_eq!(form.get("Media").unwrap(), [b"a.png", b"b.png"]);
/// assert_eq!(form.first("To"), Some("+15550001111"));
/// assert_eq!(form.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormParams {
    fields: BTreeMap<Vec<u8>, Vec<Vec<u8>>>,
}

impl FormParams {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the values of `key`.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.fields
            .entry(key.into())
            .or_default()
            .push(value.into());
    }

    /// The raw values submitted for `key`, in submission order.
    #[must_use]
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&[Vec<u8>]> {
        self.fields.get(key.as_ref()).map(Vec::as_slice)
    }

    /// The first value submitted for `key`, if it is valid UTF-8.
    #[must_use]
    pub fn first(&self, key: impl AsRef<[u8]>) -> Option<&str> {
        self.first_bytes(key)
            .and_then(|value| std::str::from_utf8(value).ok())
    }

    /// The first raw value submitted for `key`.
    #[must_use]
    pub fn first_bytes(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        self.fields
            .get(key.as_ref())
            .and_then(|values| values.first())
            .map(Vec::as_slice)
    }

    /// Iterate over `(name, values)` with names in ascending byte-wise order.
    pub fn iter(&self) -> btree_map::Iter<'_, Vec<u8>, Vec<Vec<u8>>> {
        self.fields.iter()
    }

    /// Number of distinct field names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the form has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a URL-encoded form body.
    ///
    /// `+` decodes to a space and `%XX` to the corresponding byte. Empty
    /// segments are skipped and a segment without `=` yields an empty value.
    /// Decoded bytes are kept as they are, whether or not they form UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MalformedBody`] if the body is larger than
    /// [`MAX_FORM_BODY_BYTES`], contains a `;` separator, or contains a `%` not
    /// followed by two hex digits.
    pub fn parse(body: &[u8]) -> Result<Self, AuthError> {
        if body.len() > MAX_FORM_BODY_BYTES {
            return Err(AuthError::malformed(format!(
                "form body of {} bytes exceeds the {MAX_FORM_BODY_BYTES} byte limit",
                body.len()
            )));
        }

        let mut form = Self::new();
        for segment in body.split(|b| *b == b'&') {
            if segment.is_empty() {
                continue;
            }
            if segment.contains(&b';') {
                return Err(AuthError::malformed("invalid semicolon separator"));
            }

            let (key, value) = match segment.iter().position(|b| *b == b'=') {
                Some(idx) => (&segment[..idx], &segment[idx + 1..]),
                None => (segment, &[][..]),
            };

            form.insert(decode_component(key)?, decode_component(value)?);
        }

        Ok(form)
    }

    /// Serialize the form back to `application/x-www-form-urlencoded`.
    ///
    /// Fields are written in key order, values in submission order.
    #[must_use]
    pub fn to_urlencoded(&self) -> String {
        let mut encoded = String::new();
        for (key, values) in &self.fields {
            for value in values {
                if !encoded.is_empty() {
                    encoded.push('&');
                }
                encoded.extend(form_urlencoded::byte_serialize(key));
                encoded.push('=');
                encoded.extend(form_urlencoded::byte_serialize(value));
            }
        }
        encoded
    }
}

impl<'a> IntoIterator for &'a FormParams {
    type Item = (&'a Vec<u8>, &'a Vec<Vec<u8>>);
    type IntoIter = btree_map::Iter<'a, Vec<u8>, Vec<Vec<u8>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl<K: Into<Vec<u8>>, V: Into<Vec<u8>>> FromIterator<(K, V)> for FormParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Self::new();
        for (key, value) in iter {
            form.insert(key, value);
        }
        form
    }
}

/// Decode a single `name` or `value` component.
fn decode_component(raw: &[u8]) -> Result<Vec<u8>, AuthError> {
    validate_escapes(raw)?;

    let unplussed: Vec<u8> = raw
        .iter()
        .map(|b| if *b == b'+' { b' ' } else { *b })
        .collect();

    Ok(percent_decode(&unplussed).collect())
}

/// Reject `%` sequences that are not followed by two hex digits.
fn validate_escapes(raw: &[u8]) -> Result<(), AuthError> {
    let mut idx = 0;
    while idx < raw.len() {
        if raw[idx] == b'%' {
            let valid = raw
                .get(idx + 1..idx + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                let end = (idx + 3).min(raw.len());
                return Err(AuthError::malformed(format!(
                    "invalid URL escape {:?}",
                    String::from_utf8_lossy(&raw[idx..end])
                )));
            }
            idx += 3;
        } else {
            idx += 1;
        }
    }
    Ok(())
}
