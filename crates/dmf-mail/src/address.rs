//! Email address list parsing.
//!
//! Route configuration stores senders and recipients as free text, structured
//! email values, or sequences mixing both:
//!
//! ```text
//! address@domain.tld
//! Some Name <address@domain.tld>
//! address@domain.tld, address-2@domain.tld
//! Some Name <address@domain.tld>, address-2@domain.tld, Other Name <address-3@domain.tld>
//! ["address@domain.tld", "Some Name <address@domain.tld>"]
//! ```
//!
//! [`parse_addresses`] turns any of these into a list of [`Address`] records.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::{EmailValue, FieldValue};

/// `Some Name <address@domain.tld>`
static NAMED_ADDRESS: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^([^<]+)<([^>]+)>$").expect("Invalid regex pattern"));

/// A parsed mailbox.
///
/// The address is never empty; the name may be.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
	#[serde(default)]
	name: String,
	address: String,
}

impl Address {
	pub fn new(address: impl Into<String>) -> Self {
		Self {
			name: String::new(),
			address: address.into(),
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	/// Display name, if any.
	pub fn name(&self) -> Option<&str> {
		if self.name.is_empty() {
			None
		} else {
			Some(&self.name)
		}
	}

	pub fn address(&self) -> &str {
		&self.address
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.name() {
			Some(name) => write!(f, "{} <{}>", name, self.address),
			None => write!(f, "{}", self.address),
		}
	}
}

/// Any value the address parser accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressInput {
	/// Free text, possibly a comma-separated list.
	Raw(String),
	/// Exactly one mailbox.
	Structured(EmailValue),
	/// Ordered items; string items are not split further.
	Sequence(Vec<AddressInput>),
}

impl AddressInput {
	/// Whether the input carries no text at all.
	pub fn is_empty(&self) -> bool {
		match self {
			AddressInput::Raw(raw) => raw.trim().is_empty(),
			AddressInput::Structured(value) => value.address().trim().is_empty(),
			AddressInput::Sequence(items) => items.iter().all(AddressInput::is_empty),
		}
	}
}

impl fmt::Display for AddressInput {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AddressInput::Raw(raw) => write!(f, "{}", raw),
			AddressInput::Structured(value) => write!(f, "{}", value),
			AddressInput::Sequence(items) => {
				let rendered: Vec<String> = items
					.iter()
					.filter(|item| !item.is_empty())
					.map(ToString::to_string)
					.collect();
				write!(f, "{}", rendered.join(", "))
			}
		}
	}
}

impl From<&str> for AddressInput {
	fn from(value: &str) -> Self {
		AddressInput::Raw(value.to_string())
	}
}

impl From<String> for AddressInput {
	fn from(value: String) -> Self {
		AddressInput::Raw(value)
	}
}

impl From<EmailValue> for AddressInput {
	fn from(value: EmailValue) -> Self {
		AddressInput::Structured(value)
	}
}

impl<T: Into<AddressInput>> From<Vec<T>> for AddressInput {
	fn from(values: Vec<T>) -> Self {
		AddressInput::Sequence(values.into_iter().map(Into::into).collect())
	}
}

impl From<FieldValue> for AddressInput {
	fn from(value: FieldValue) -> Self {
		match value {
			FieldValue::Text(text) => AddressInput::Raw(text),
			FieldValue::Email(email) => AddressInput::Structured(email),
			FieldValue::Multi(values) => {
				AddressInput::Sequence(values.into_iter().map(Into::into).collect())
			}
			file @ FieldValue::File(_) => AddressInput::Raw(file.to_string()),
		}
	}
}

impl From<&FieldValue> for AddressInput {
	fn from(value: &FieldValue) -> Self {
		value.clone().into()
	}
}

/// Parse an address list into mailboxes.
///
/// With `only_one` the whole input is a single entry and commas are not
/// treated as separators; this is used for senders and reply-to addresses.
/// Structured values are always a single entry. Commas inside `<...>` or
/// `"..."` do not separate entries unless the bracket or quote is never
/// closed. Order and duplicates are preserved, empty entries are dropped.
///
/// # Examples
///
/// ```
/// use dmf_mail::{Address, parse_addresses};
///
/// let parsed = parse_addresses(&"a@x.com, B <b@x.com>".into(), false);
/// assert_eq!(
///     parsed,
///     vec![Address::new("a@x.com"), Address::new("b@x.com").with_name("B")],
/// );
///
/// let single = parse_addresses(&"a@x.com, b@x.com".into(), true);
/// assert_eq!(single, vec![Address::new("a@x.com, b@x.com")]);
/// ```
pub fn parse_addresses(input: &AddressInput, only_one: bool) -> Vec<Address> {
	let mut entries = Vec::new();
	collect_entries(input, only_one, true, &mut entries);

	entries
		.into_iter()
		.filter_map(|entry| match entry {
			Entry::Raw(raw) => parse_entry(&raw),
			Entry::Structured(value) => from_email_value(value),
		})
		.collect()
}

enum Entry<'a> {
	Raw(String),
	Structured(&'a EmailValue),
}

fn collect_entries<'a>(
	input: &'a AddressInput,
	only_one: bool,
	split: bool,
	entries: &mut Vec<Entry<'a>>,
) {
	match input {
		AddressInput::Structured(value) => entries.push(Entry::Structured(value)),
		_ if only_one => entries.push(Entry::Raw(input.to_string())),
		AddressInput::Raw(raw) if split => {
			entries.extend(split_top_level(raw).into_iter().map(Entry::Raw));
		}
		AddressInput::Raw(raw) => entries.push(Entry::Raw(raw.clone())),
		AddressInput::Sequence(items) => {
			for item in items {
				collect_entries(item, false, false, entries);
			}
		}
	}
}

/// Split on commas that are not inside `<...>` or `"..."`.
///
/// An opening `<` or `"` that is never closed does not protect later commas.
fn split_top_level(raw: &str) -> Vec<String> {
	let mut parts = Vec::new();
	let mut start = 0;
	let mut in_angle = false;
	let mut in_quotes = false;

	for (i, c) in raw.char_indices() {
		match c {
			'"' if !in_angle => in_quotes = !in_quotes,
			'<' if !in_quotes => in_angle = true,
			'>' if !in_quotes => in_angle = false,
			',' => {
				let rest = &raw[i + 1..];
				if in_angle && !rest.contains('>') {
					in_angle = false;
				}
				if in_quotes && !rest.contains('"') {
					in_quotes = false;
				}
				if !in_angle && !in_quotes {
					parts.push(raw[start..i].to_string());
					start = i + 1;
				}
			}
			_ => {}
		}
	}
	parts.push(raw[start..].to_string());

	parts
}

fn parse_entry(raw: &str) -> Option<Address> {
	let entry = raw.trim();
	if entry.is_empty() {
		return None;
	}

	let (name, address) = match NAMED_ADDRESS.captures(entry) {
		Some(caps) => (
			unquote(caps.get(1).map_or("", |m| m.as_str()).trim()),
			caps.get(2).map_or("", |m| m.as_str()).trim(),
		),
		None => ("", entry),
	};

	if address.is_empty() {
		return None;
	}

	Some(Address::new(address).with_name(name))
}

fn from_email_value(value: &EmailValue) -> Option<Address> {
	let address = value.address().trim();
	if address.is_empty() {
		return None;
	}
	Some(Address::new(address).with_name(value.name().trim()))
}

fn unquote(name: &str) -> &str {
	name.strip_prefix('"')
		.and_then(|n| n.strip_suffix('"'))
		.map(str::trim)
		.unwrap_or(name)
}
