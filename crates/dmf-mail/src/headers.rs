//! Mail header sanitization.

use once_cell::sync::Lazy;
use regex::Regex;

/// CR, LF, form feed and escape.
static DIRTY_HEADER: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"[\r\n\x0C\x1B]").expect("Invalid regex pattern"));

/// Void a header value that could be used for header injection.
///
/// A value containing CR, LF, FF or ESC anywhere is replaced by an empty
/// string and a warning quoting the original value is logged. Clean values are
/// returned unchanged. Offending characters are never stripped.
///
/// # Examples
///
/// ```
/// use dmf_mail::sanitize_header;
///
/// assert_eq!(sanitize_header("Normal Subject"), "Normal Subject");
/// assert_eq!(sanitize_header("Subject\r\nBcc: evil@x.com"), "");
/// ```
pub fn sanitize_header(value: &str) -> String {
	if is_dirty(value) {
		tracing::warn!("Dirty mail header found: \"{}\"", value);
		return String::new();
	}
	value.to_string()
}

/// Whether the value contains characters that are not allowed in a header.
pub(crate) fn is_dirty(value: &str) -> bool {
	DIRTY_HEADER.is_match(value)
}
