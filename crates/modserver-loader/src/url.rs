//! Request URL construction.
//!
//! The default shape is `<prefix>/<module>[/<held>]`, where `<held>` is the
//! sorted, comma-joined list of modules this session already requested. Both
//! segments are encoded like `encodeURIComponent`, so `$` travels as `%24`
//! and the comma separator as `%2C`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped by `encodeURIComponent`.
const URI_COMPONENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Builds a request URL from the prefix, the module key, and the keys
/// already requested this session (in request order).
pub type UrlBuilder = fn(prefix: &str, key: &str, requested: &[String]) -> String;

/// The default [`UrlBuilder`].
pub fn request_url(prefix: &str, key: &str, requested: &[String]) -> String {
    let mut url = String::with_capacity(prefix.len() + key.len() + 1);
    url.push_str(prefix.trim_end_matches('/'));
    url.push('/');
    url.extend(utf8_percent_encode(key, URI_COMPONENT_SET));
    if !requested.is_empty() {
        let mut held: Vec<&str> = requested.iter().map(String::as_str).collect();
        held.sort_unstable();
        url.push('/');
        url.extend(utf8_percent_encode(&held.join(","), URI_COMPONENT_SET));
    }
    url
}
