//! Canonical form construction for callback signatures.
//!
//! The provider signs a single string built from the callback URL and, for
//! POST requests, every form parameter:
//!
//! ```text
//! SigningBasis  = CallbackURL + CanonicalForm
//! CanonicalForm = for each name in ascending byte order:
//!                     name + value_1 + value_2 + ...
//! ```
//!
//! No delimiters are inserted anywhere. Values of a repeated field keep their
//! submission order.

use crate::form::FormParams;

/// Build the canonical form from POST parameters.
///
/// The result is a byte string: decoded form values are not required to be
/// UTF-8.
///
/// # Examples
///
/// ```
/// use ringstack_auth::{FormParams, build_canonical_form};
///
/// let form: FormParams = [("b", "2"), ("a", "1"), ("a", "0")].into_iter().collect();
/// assert_eq!(build_canonical_form(&form), b"a10b2");
/// ```
#[must_use]
pub fn build_canonical_form(form: &FormParams) -> Vec<u8> {
    let capacity = form
        .iter()
        .map(|(name, values)| name.len() + values.iter().map(Vec::len).sum::<usize>())
        .sum();

    // `FormParams` iterates names in ascending byte order.
    let mut result = Vec::with_capacity(capacity);
    for (name, values) in form {
        result.extend_from_slice(name);
        for value in values {
            result.extend_from_slice(value);
        }
    }
    result
}

/// Build the bytes that are fed to the HMAC.
///
/// For a `POST` (compared case-insensitively) the canonical form of `form` is
/// appended to `url`; every other method signs the URL alone, even when the
/// URL carries query parameters.
///
/// # Examples
///
/// ```
/// use ringstack_auth::{FormParams, build_signing_basis};
///
/// let form: FormParams = [("To", "+1555")].into_iter().collect();
/// assert_eq!(
///     build_signing_basis("POST", "https://example.com/hook", Some(&form)),
///     b"https://example.com/hookTo+1555"
/// );
/// assert_eq!(
///     build_signing_basis("GET", "https://example.com/hook?To=1", Some(&form)),
///     b"https://example.com/hook?To=1"
/// );
/// ```
#[must_use]
pub fn build_signing_basis(method: &str, url: &str, form: Option<&FormParams>) -> Vec<u8> {
    let mut basis = url.as_bytes().to_vec();
    if let Some(form) = form.filter(|_| is_post(method)) {
        basis.extend_from_slice(&build_canonical_form(form));
    }
    basis
}

/// Whether `method` is `POST`, ignoring ASCII case.
pub(crate) fn is_post(method: &str) -> bool {
    method.eq_ignore_ascii_case("POST")
}
