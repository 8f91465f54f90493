//! WhatsApp deep-link construction.
//!
//! Produces `<send_base>?phone=<handle>&text=<url-encoded message>` — the
//! externally defined shape the site's contact buttons open. Pure function;
//! the only failure mode is a malformed base URL.

use url::Url;

/// Build the deep link for one selected target and composed message.
///
/// Query encoding (including `+` for spaces) is handled by the `url` crate's
/// form serializer, matching what the WhatsApp endpoint expects.
///
/// # Errors
///
/// Returns [`url::ParseError`] when `send_base` is not a valid absolute URL.
pub fn build_send_link(send_base: &str, phone: &str, text: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(send_base, &[("phone", phone), ("text", text)])
}
