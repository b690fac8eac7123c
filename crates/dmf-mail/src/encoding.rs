//! Display-name encoding policies.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::MailError;

/// How display names are handed to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameEncoding {
	/// Pass names through; lettre applies RFC 2047 encoding itself.
	#[default]
	Raw,
	/// Pre-encode non-ASCII names as `=?UTF-8?B?...?=`.
	EncodedWord,
}

impl NameEncoding {
	/// Apply the policy to a display name.
	///
	/// # Examples
	///
	/// ```
	/// use dmf_mail::NameEncoding;
	///
	/// assert_eq!(NameEncoding::Raw.apply("Jürgen"), "Jürgen");
	/// assert_eq!(NameEncoding::EncodedWord.apply("Jürgen"), "=?UTF-8?B?SsO8cmdlbg==?=");
	/// assert_eq!(NameEncoding::EncodedWord.apply("Plain"), "Plain");
	/// ```
	pub fn apply(&self, name: &str) -> String {
		match self {
			NameEncoding::Raw => name.to_string(),
			NameEncoding::EncodedWord
				if name.is_ascii() && !name.chars().any(|c| c.is_ascii_control()) =>
			{
				name.to_string()
			}
			NameEncoding::EncodedWord => encode_word(name),
		}
	}
}

impl FromStr for NameEncoding {
	type Err = MailError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"raw" => Ok(NameEncoding::Raw),
			"encoded_word" | "encoded-word" | "base64" => Ok(NameEncoding::EncodedWord),
			other => Err(MailError::Configuration(format!(
				"Invalid name encoding: {}",
				other
			))),
		}
	}
}

/// Encode a string as an RFC 2047 base64 encoded word.
///
/// The value is trimmed before encoding.
pub fn encode_word(value: &str) -> String {
	format!("=?UTF-8?B?{}?=", STANDARD.encode(value.trim()))
}

/// Display name ready to be written into an address header as-is.
///
/// Names the transport would have to encode become encoded words; other
/// names are written as atoms, or as a quoted string when they contain
/// specials such as `,` or `<`.
pub(crate) fn encoded_display_name(name: &str) -> String {
	let name = name.trim();
	let word = NameEncoding::EncodedWord.apply(name);
	if word != name {
		return word;
	}

	let is_phrase = name
		.chars()
		.all(|c| c.is_ascii_alphanumeric() || c == ' ' || "!#$%&'*+-/=?^_`{|}~".contains(c));
	if is_phrase {
		return name.to_string();
	}

	let mut quoted = String::with_capacity(name.len() + 2);
	quoted.push('"');
	for c in name.chars() {
		if c == '"' || c == '\\' {
			quoted.push('\\');
		}
		quoted.push(c);
	}
	quoted.push('"');
	quoted
}
