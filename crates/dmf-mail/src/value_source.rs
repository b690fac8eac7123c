//! Value sources: route settings resolved against the submitted form data.

use serde::{Deserialize, Serialize};

use crate::value::{EmailValue, FieldValue, FormData};

/// Builds an [`EmailValue`] from route configuration.
///
/// Accepts either a bare address string or an `{ address, name }` map.
///
/// # Examples
///
/// ```
/// use dmf_mail::EmailValueSource;
///
/// let source: EmailValueSource = serde_json::from_str(r#""forms@example.com""#).unwrap();
/// assert_eq!(source.build().unwrap().to_string(), "forms@example.com");
///
/// assert!(EmailValueSource::new("", "Nobody").build().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EmailValueSourceRepr")]
pub struct EmailValueSource {
	pub address: String,
	pub name: String,
}

impl EmailValueSource {
	pub const KEYWORD: &'static str = "email";

	pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			address: address.into(),
			name: name.into(),
		}
	}

	/// The email value, or `None` when no address is configured.
	pub fn build(&self) -> Option<EmailValue> {
		if self.address.is_empty() {
			return None;
		}
		Some(EmailValue::new(self.address.clone(), self.name.clone()))
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EmailValueSourceRepr {
	Address(String),
	Full {
		#[serde(default)]
		address: String,
		#[serde(default)]
		name: String,
	},
}

impl From<EmailValueSourceRepr> for EmailValueSource {
	fn from(repr: EmailValueSourceRepr) -> Self {
		match repr {
			EmailValueSourceRepr::Address(address) => Self {
				address,
				name: String::new(),
			},
			EmailValueSourceRepr::Full { address, name } => Self { address, name },
		}
	}
}

/// A configured route value.
///
/// # Examples
///
/// ```
/// use dmf_mail::{FieldValue, FormData, ValueSource};
///
/// let mut data = FormData::new();
/// data.insert("email", "alice@example.com");
///
/// let source: ValueSource = serde_json::from_str(r#"{"field": "email"}"#).unwrap();
/// assert_eq!(source.resolve(&data), Some(FieldValue::from("alice@example.com")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueSource {
	/// Literal string
	Constant(String),
	/// Literal string in map form: `{ "constant": "..." }`
	ConstantMap { constant: String },
	/// `{ "email": ... }`
	Email { email: EmailValueSource },
	/// Value of a form field: `{ "field": "name" }`
	Field { field: String },
	/// Several sources; empty results are skipped.
	Multi { multi: Vec<ValueSource> },
}

impl ValueSource {
	pub fn constant(value: impl Into<String>) -> Self {
		ValueSource::Constant(value.into())
	}

	pub fn field(name: impl Into<String>) -> Self {
		ValueSource::Field { field: name.into() }
	}

	pub fn email(address: impl Into<String>, name: impl Into<String>) -> Self {
		ValueSource::Email {
			email: EmailValueSource::new(address, name),
		}
	}

	/// Resolve the source against the form data.
	///
	/// Returns `None` when the result is empty.
	pub fn resolve(&self, data: &FormData) -> Option<FieldValue> {
		let value = match self {
			ValueSource::Constant(value) | ValueSource::ConstantMap { constant: value } => {
				FieldValue::Text(value.clone())
			}
			ValueSource::Email { email } => FieldValue::Email(email.build()?),
			ValueSource::Field { field } => data.get(field)?.clone(),
			ValueSource::Multi { multi } => {
				FieldValue::Multi(multi.iter().filter_map(|s| s.resolve(data)).collect())
			}
		};

		if value.is_empty() { None } else { Some(value) }
	}
}

impl From<&str> for ValueSource {
	fn from(value: &str) -> Self {
		ValueSource::constant(value)
	}
}

impl From<EmailValueSource> for ValueSource {
	fn from(email: EmailValueSource) -> Self {
		ValueSource::Email { email }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn data() -> FormData {
		let mut data = FormData::new();
		data.insert("email", "alice@example.com");
		data.insert("blank", "");
		data
	}

	#[rstest]
	#[case(r#""sales@example.com""#, ValueSource::constant("sales@example.com"))]
	#[case(r#"{"constant": "Hello"}"#, ValueSource::ConstantMap { constant: "Hello".to_string() })]
	#[case(r#"{"email": "a@x.com"}"#, ValueSource::email("a@x.com", ""))]
	#[case(r#"{"email": {"address": "a@x.com", "name": "A"}}"#, ValueSource::email("a@x.com", "A"))]
	#[case(r#"{"field": "email"}"#, ValueSource::field("email"))]
	fn test_deserialize(#[case] json: &str, #[case] expected: ValueSource) {
		// Act
		let source: ValueSource = serde_json::from_str(json).unwrap();

		// Assert
		assert_eq!(source, expected);
	}

	#[rstest]
	fn test_email_source_resolves_to_email_value(data: FormData) {
		// Act
		let value = ValueSource::email("forms@example.com", "Forms").resolve(&data);

		// Assert
		assert_eq!(
			value,
			Some(FieldValue::Email(EmailValue::new("forms@example.com", "Forms")))
		);
	}

	#[rstest]
	#[case(ValueSource::email("", "Forms"))]
	#[case(ValueSource::constant(""))]
	#[case(ValueSource::field("blank"))]
	#[case(ValueSource::field("missing"))]
	#[case(ValueSource::Multi { multi: vec![ValueSource::field("blank")] })]
	fn test_empty_sources_resolve_to_none(data: FormData, #[case] source: ValueSource) {
		// Act / Assert
		assert_eq!(source.resolve(&data), None);
	}

	#[rstest]
	fn test_multi_skips_empty_entries(data: FormData) {
		// Arrange
		let source: ValueSource = serde_json::from_str(
			r#"{"multi": ["sales@example.com", {"field": "missing"}, {"field": "email"}]}"#,
		)
		.unwrap();

		// Act
		let value = source.resolve(&data).unwrap();

		// Assert
		assert_eq!(value.to_string(), "sales@example.com, alice@example.com");
	}
}
