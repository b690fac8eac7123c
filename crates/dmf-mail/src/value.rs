//! Form data values handed to the mail route.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured email address value.
///
/// # Examples
///
/// ```
/// use dmf_mail::EmailValue;
///
/// assert_eq!(EmailValue::new("a@b.com", "Alice").to_string(), "Alice <a@b.com>");
/// assert_eq!(EmailValue::new("a@b.com", "").to_string(), "a@b.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailValue {
	address: String,
	#[serde(default)]
	name: String,
}

impl EmailValue {
	pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			address: address.into(),
			name: name.into(),
		}
	}

	pub fn address(&self) -> &str {
		&self.address
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}

impl fmt::Display for EmailValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.name.is_empty() {
			write!(f, "{}", self.address)
		} else {
			write!(f, "{} <{}>", self.name, self.address)
		}
	}
}

/// Reference to an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileValue {
	file_name: String,
	#[serde(default)]
	relative_path: String,
	#[serde(default)]
	public_url: String,
	#[serde(default)]
	mime_type: String,
}

impl FileValue {
	pub fn new(
		file_name: impl Into<String>,
		relative_path: impl Into<String>,
		public_url: impl Into<String>,
		mime_type: impl Into<String>,
	) -> Self {
		Self {
			file_name: file_name.into(),
			relative_path: relative_path.into(),
			public_url: public_url.into(),
			mime_type: mime_type.into(),
		}
	}

	/// Original name of the uploaded file.
	pub fn file_name(&self) -> &str {
		&self.file_name
	}

	/// Path of the file inside the file storage.
	pub fn relative_path(&self) -> &str {
		&self.relative_path
	}

	pub fn public_url(&self) -> &str {
		&self.public_url
	}

	pub fn mime_type(&self) -> &str {
		&self.mime_type
	}
}

impl fmt::Display for FileValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.public_url.is_empty() {
			write!(f, "{}", self.file_name)
		} else {
			write!(f, "{}", self.public_url)
		}
	}
}

/// A single form field value.
///
/// Variant order matters for deserialization. Arrays must be tried before
/// the struct variants, since derived struct deserializers also accept a
/// sequence of field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
	Text(String),
	Multi(Vec<FieldValue>),
	Email(EmailValue),
	File(FileValue),
}

impl FieldValue {
	pub fn as_file(&self) -> Option<&FileValue> {
		match self {
			FieldValue::File(file) => Some(file),
			_ => None,
		}
	}

	pub fn is_file(&self) -> bool {
		matches!(self, FieldValue::File(_))
	}

	/// Whether the value renders to an empty string.
	pub fn is_empty(&self) -> bool {
		match self {
			FieldValue::Text(text) => text.is_empty(),
			FieldValue::Email(email) => email.address().is_empty(),
			FieldValue::File(_) => false,
			FieldValue::Multi(values) => values.iter().all(FieldValue::is_empty),
		}
	}

	/// Template context representation.
	///
	/// Multi values become arrays; everything else its display string.
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			FieldValue::Multi(values) => {
				serde_json::Value::Array(values.iter().map(FieldValue::to_json).collect())
			}
			other => serde_json::Value::String(other.to_string()),
		}
	}
}

impl fmt::Display for FieldValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FieldValue::Text(text) => write!(f, "{}", text),
			FieldValue::Email(email) => write!(f, "{}", email),
			FieldValue::File(file) => write!(f, "{}", file),
			FieldValue::Multi(values) => {
				let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
				write!(f, "{}", rendered.join(", "))
			}
		}
	}
}

impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		FieldValue::Text(value.to_string())
	}
}

impl From<String> for FieldValue {
	fn from(value: String) -> Self {
		FieldValue::Text(value)
	}
}

impl From<EmailValue> for FieldValue {
	fn from(value: EmailValue) -> Self {
		FieldValue::Email(value)
	}
}

impl From<FileValue> for FieldValue {
	fn from(value: FileValue) -> Self {
		FieldValue::File(value)
	}
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
	fn from(values: Vec<T>) -> Self {
		FieldValue::Multi(values.into_iter().map(Into::into).collect())
	}
}

/// Submitted form data in field order.
///
/// # Examples
///
/// ```
/// use dmf_mail::{FieldValue, FileValue, FormData};
///
/// let mut data = FormData::new();
/// data.insert("name", "Alice");
/// data.insert("cv", FileValue::new("cv.pdf", "uploads/cv.pdf", "", "application/pdf"));
///
/// assert_eq!(data.files().count(), 1);
/// assert_eq!(data.without_files().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
	fields: IndexMap<String, FieldValue>,
}

impl FormData {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a field, replacing an existing value in place.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
		self.fields.insert(name.into(), value.into());
	}

	pub fn get(&self, name: &str) -> Option<&FieldValue> {
		self.fields.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.fields.contains_key(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
		self.fields.iter().map(|(name, value)| (name.as_str(), value))
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Uploaded file fields.
	pub fn files(&self) -> impl Iterator<Item = (&str, &FileValue)> {
		self.iter()
			.filter_map(|(name, value)| value.as_file().map(|file| (name, file)))
	}

	/// All fields except uploaded files.
	pub fn without_files(&self) -> FormData {
		self.iter()
			.filter(|(_, value)| !value.is_file())
			.map(|(name, value)| (name.to_string(), value.clone()))
			.collect()
	}

	/// Only the named fields, in the order they were submitted.
	pub fn select(&self, names: &[String]) -> FormData {
		self.iter()
			.filter(|(name, _)| names.iter().any(|n| n == name))
			.map(|(name, value)| (name.to_string(), value.clone()))
			.collect()
	}

	/// Template context for the form data.
	pub fn to_json(&self) -> serde_json::Value {
		let map: serde_json::Map<String, serde_json::Value> = self
			.iter()
			.map(|(name, value)| (name.to_string(), value.to_json()))
			.collect();
		serde_json::Value::Object(map)
	}
}

impl FromIterator<(String, FieldValue)> for FormData {
	fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
		Self {
			fields: iter.into_iter().collect(),
		}
	}
}

impl<'a> IntoIterator for &'a FormData {
	type Item = (&'a String, &'a FieldValue);
	type IntoIter = indexmap::map::Iter<'a, String, FieldValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.fields.iter()
	}
}
