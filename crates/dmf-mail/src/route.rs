//! The mail route and its configuration.

use serde::{Deserialize, Serialize};

use crate::address::AddressInput;
use crate::dispatcher::{DispatchError, MailDataDispatcher, MailPreview, MailServices};
use crate::templates::{ALL_VALUES_PLACEHOLDER, TemplateConfig};
use crate::value::{FieldValue, FormData};
use crate::value_source::ValueSource;
use crate::{MailError, MailResult};

pub const DEFAULT_SUBJECT: &str = "New Form Submission";

/// Route configuration as stored with the form.
///
/// # Examples
///
/// ```
/// use dmf_mail::MailRouteConfig;
///
/// let config: MailRouteConfig = serde_json::from_str(r#"{
///     "sender": {"email": "forms@example.com"},
///     "recipients": {"field": "email"},
///     "useHtml": true,
///     "htmlTemplate": "<p>{{ name }}</p>"
/// }"#).unwrap();
///
/// assert_eq!(config.subject.resolve(&Default::default()).unwrap().to_string(), "New Form Submission");
/// assert!(config.passthrough_fields);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MailRouteConfig {
	pub sender: Option<ValueSource>,
	pub recipients: Option<ValueSource>,
	pub reply_to: Option<ValueSource>,
	pub subject: ValueSource,
	pub include_attachments_in_mail: bool,
	pub plain_text_template: TemplateConfig,
	pub use_html: bool,
	pub html_template: TemplateConfig,
	/// Render all fields; otherwise only those named in `fields`.
	pub passthrough_fields: bool,
	pub fields: Vec<String>,
}

impl Default for MailRouteConfig {
	fn default() -> Self {
		Self {
			sender: None,
			recipients: None,
			reply_to: None,
			subject: ValueSource::constant(DEFAULT_SUBJECT),
			include_attachments_in_mail: false,
			plain_text_template: TemplateConfig::new(ALL_VALUES_PLACEHOLDER),
			use_html: false,
			html_template: TemplateConfig::default(),
			passthrough_fields: true,
			fields: Vec::new(),
		}
	}
}

/// A configured mail output of a form.
#[derive(Debug, Clone)]
pub struct MailRoute {
	keyword: String,
	config: MailRouteConfig,
}

impl MailRoute {
	pub fn new(keyword: impl Into<String>, config: MailRouteConfig) -> Self {
		Self {
			keyword: keyword.into(),
			config,
		}
	}

	pub fn keyword(&self) -> &str {
		&self.keyword
	}

	pub fn config(&self) -> &MailRouteConfig {
		&self.config
	}

	fn required(
		&self,
		name: &str,
		source: Option<&ValueSource>,
		data: &FormData,
	) -> MailResult<FieldValue> {
		source
			.and_then(|source| source.resolve(data))
			.ok_or_else(|| {
				MailError::Configuration(format!(
					"route \"{}\": {} must not be empty",
					self.keyword, name
				))
			})
	}

	/// Build the dispatcher for one submission.
	///
	/// Value sources resolve against the full form data; bodies render only
	/// the selected fields unless passthrough is on.
	pub fn dispatcher(
		&self,
		services: &MailServices,
		data: &FormData,
	) -> MailResult<MailDataDispatcher> {
		let from = AddressInput::from(self.required("sender", self.config.sender.as_ref(), data)?);
		let to = AddressInput::from(self.required(
			"recipients",
			self.config.recipients.as_ref(),
			data,
		)?);
		let subject = self
			.required("subject", Some(&self.config.subject), data)?
			.to_string();

		let mut dispatcher = MailDataDispatcher::new(services.clone(), from, to, subject)
			.with_attached_uploads(self.config.include_attachments_in_mail)
			.with_plain_template(self.config.plain_text_template.clone())
			.with_html_template(self.config.html_template.clone(), self.config.use_html);

		if let Some(reply_to) = self
			.config
			.reply_to
			.as_ref()
			.and_then(|source| source.resolve(data))
		{
			dispatcher = dispatcher.with_reply_to(AddressInput::from(reply_to));
		}

		Ok(dispatcher)
	}

	fn route_data(&self, data: &FormData) -> FormData {
		if self.config.passthrough_fields {
			data.clone()
		} else {
			data.select(&self.config.fields)
		}
	}

	pub async fn send(
		&self,
		services: &MailServices,
		data: &FormData,
	) -> Result<(), DispatchError> {
		let dispatcher = self.dispatcher(services, data)?;
		tracing::debug!(route = %self.keyword, "dispatching mail route");
		dispatcher.send(&self.route_data(data)).await
	}

	pub async fn preview(
		&self,
		services: &MailServices,
		data: &FormData,
	) -> Result<MailPreview, DispatchError> {
		let dispatcher = self.dispatcher(services, data)?;
		dispatcher.preview(&self.route_data(data)).await
	}
}
