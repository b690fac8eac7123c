//! Template integration for mail body generation
//!
//! Bodies are rendered from the submitted form data. Three engines are
//! available: plain `{{field}}` substitution, the key/value listing used by
//! older route configurations, and Tera (feature `tera`).

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::MailResult;
use crate::value::FormData;

/// Placeholder replaced by a listing of every submitted field.
pub const ALL_VALUES_PLACEHOLDER: &str = "{{all_values}}";

const ALL_VALUES: &str = "all_values";

/// Output format of a rendered template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
	PlainText,
	Html,
}

/// Template configuration of a route.
///
/// Deserializes from a bare string or from `{ "template": "..." }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TemplateConfigRepr")]
pub struct TemplateConfig {
	pub template: String,
}

impl TemplateConfig {
	pub fn new(template: impl Into<String>) -> Self {
		Self {
			template: template.into(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.template.is_empty()
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TemplateConfigRepr {
	Inline(String),
	Full {
		#[serde(default)]
		template: String,
	},
}

impl From<TemplateConfigRepr> for TemplateConfig {
	fn from(repr: TemplateConfigRepr) -> Self {
		match repr {
			TemplateConfigRepr::Inline(template) | TemplateConfigRepr::Full { template } => {
				Self { template }
			}
		}
	}
}

/// Trait for template engines
pub trait TemplateEngine: Send + Sync {
	/// Render a template against the form data
	fn render(
		&self,
		config: &TemplateConfig,
		format: TemplateFormat,
		data: &FormData,
	) -> MailResult<String>;
}

/// Escape HTML special characters.
///
/// # Examples
///
/// ```
/// use dmf_mail::escape_html;
///
/// assert_eq!(escape_html("<a href=\"x\">'&'</a>"), "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;");
/// ```
pub fn escape_html(input: &str) -> String {
	let mut escaped = String::with_capacity(input.len());
	for c in input.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#x27;"),
			other => escaped.push(other),
		}
	}
	escaped
}

/// Replace `{{name}}` with the field value, escaping values for HTML output.
///
/// The template is scanned once, so placeholders inside substituted values
/// or inside `listing` stay literal. `listing` fills `{{all_values}}`.
fn substitute_fields(
	template: &str,
	data: &FormData,
	format: TemplateFormat,
	listing: Option<&str>,
) -> String {
	let mut result = String::with_capacity(template.len());
	let mut rest = template;

	while let Some(start) = rest.find("{{") {
		result.push_str(&rest[..start]);
		let token = &rest[start..];
		let Some(end) = token[2..].find("}}") else {
			rest = token;
			break;
		};

		let name = &token[2..2 + end];
		let replacement = match (data.get(name), listing) {
			(Some(value), _) => {
				let raw = value.to_string();
				Some(match format {
					TemplateFormat::Html => escape_html(&raw),
					TemplateFormat::PlainText => raw,
				})
			}
			(None, Some(listing)) if name == ALL_VALUES => Some(listing.to_string()),
			_ => None,
		};

		match replacement {
			Some(replacement) => {
				result.push_str(&replacement);
				rest = &token[end + 4..];
			}
			// Unknown names are kept; rescan from the next brace for `{{{name}}}`.
			None => {
				result.push('{');
				rest = &token[1..];
			}
		}
	}

	result.push_str(rest);
	result
}

/// `{{field}}` substitution.
///
/// # Examples
///
/// ```
/// use dmf_mail::{FormData, SimpleTemplateEngine, TemplateConfig, TemplateEngine, TemplateFormat};
///
/// let mut data = FormData::new();
/// data.insert("name", "Alice");
///
/// let body = SimpleTemplateEngine
///     .render(&TemplateConfig::new("Hello {{name}}"), TemplateFormat::PlainText, &data)
///     .unwrap();
/// assert_eq!(body, "Hello Alice");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTemplateEngine;

impl TemplateEngine for SimpleTemplateEngine {
	fn render(
		&self,
		config: &TemplateConfig,
		format: TemplateFormat,
		data: &FormData,
	) -> MailResult<String> {
		Ok(substitute_fields(&config.template, data, format, None))
	}
}

/// Lists every field as `name = value`, one per line.
///
/// An empty template renders the listing alone. Otherwise `{{all_values}}`
/// in the template is replaced by the listing, unless a field of that name
/// was submitted, and `{{field}}` placeholders behave as in
/// [`SimpleTemplateEngine`].
#[derive(Debug, Clone)]
pub struct KeyValueTemplateEngine {
	value_delimiter: String,
	line_delimiter: String,
}

impl Default for KeyValueTemplateEngine {
	fn default() -> Self {
		Self {
			value_delimiter: " = ".to_string(),
			line_delimiter: "\n".to_string(),
		}
	}
}

impl KeyValueTemplateEngine {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_value_delimiter(mut self, delimiter: impl Into<String>) -> Self {
		self.value_delimiter = delimiter.into();
		self
	}

	pub fn with_line_delimiter(mut self, delimiter: impl Into<String>) -> Self {
		self.line_delimiter = delimiter.into();
		self
	}

	/// The field listing, escaped for HTML output.
	pub fn listing(&self, data: &FormData, format: TemplateFormat) -> String {
		data.iter()
			.map(|(name, value)| {
				let line = format!("{}{}{}", name, self.value_delimiter, value);
				match format {
					TemplateFormat::Html => escape_html(&line),
					TemplateFormat::PlainText => line,
				}
			})
			.collect::<Vec<_>>()
			.join(&self.line_delimiter)
	}
}

impl TemplateEngine for KeyValueTemplateEngine {
	fn render(
		&self,
		config: &TemplateConfig,
		format: TemplateFormat,
		data: &FormData,
	) -> MailResult<String> {
		let listing = self.listing(data, format);
		if config.is_empty() {
			return Ok(listing);
		}

		Ok(substitute_fields(
			&config.template,
			data,
			format,
			Some(&listing),
		))
	}
}

/// Tera templates with the form data as context.
///
/// Besides the fields, the context holds `all_values`, the key/value listing
/// of all fields. HTML output is autoescaped.
#[cfg(feature = "tera")]
#[derive(Debug, Clone, Default)]
pub struct TeraTemplateEngine {
	listing: KeyValueTemplateEngine,
}

#[cfg(feature = "tera")]
impl TeraTemplateEngine {
	pub fn new() -> Self {
		Self::default()
	}
}

#[cfg(feature = "tera")]
impl TemplateEngine for TeraTemplateEngine {
	fn render(
		&self,
		config: &TemplateConfig,
		format: TemplateFormat,
		data: &FormData,
	) -> MailResult<String> {
		if config.is_empty() {
			return Ok(String::new());
		}

		let mut context = tera::Context::from_value(data.to_json())
			.map_err(|e| crate::MailError::Template(e.to_string()))?;
		if !data.contains(ALL_VALUES) {
			context.insert(
				ALL_VALUES,
				&self.listing.listing(data, TemplateFormat::PlainText),
			);
		}

		let autoescape = format == TemplateFormat::Html;
		tera::Tera::one_off(&config.template, &context, autoescape).map_err(|e| {
			let detail = std::error::Error::source(&e)
				.map(|source| format!("{}: {}", e, source))
				.unwrap_or_else(|| e.to_string());
			crate::MailError::Template(detail)
		})
	}
}

/// Engine used when none is injected.
pub fn default_template_engine() -> Arc<dyn TemplateEngine> {
	#[cfg(feature = "tera")]
	{
		Arc::new(TeraTemplateEngine::new())
	}
	#[cfg(not(feature = "tera"))]
	{
		Arc::new(KeyValueTemplateEngine::new())
	}
}
