//! The mail data dispatcher: renders, composes and sends one message.

use dmf_storages::StorageBackend;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::address::{Address, AddressInput};
use crate::backends::MailManager;
use crate::composer::{ComposeInput, compose, compose_with};
use crate::message::{Attachment, MailMessage};
use crate::templates::{TemplateConfig, TemplateEngine, TemplateFormat, default_template_engine};
use crate::value::FormData;
use crate::{MailError, MailResult};

/// Collaborators shared by every mail route.
#[derive(Clone)]
pub struct MailServices {
	pub mail_manager: Arc<dyn MailManager>,
	pub template_engine: Arc<dyn TemplateEngine>,
	pub file_storage: Arc<dyn StorageBackend>,
}

impl MailServices {
	pub fn new(
		mail_manager: Arc<dyn MailManager>,
		template_engine: Arc<dyn TemplateEngine>,
		file_storage: Arc<dyn StorageBackend>,
	) -> Self {
		Self {
			mail_manager,
			template_engine,
			file_storage,
		}
	}

	/// Services using [`default_template_engine`].
	pub fn with_defaults(
		mail_manager: Arc<dyn MailManager>,
		file_storage: Arc<dyn StorageBackend>,
	) -> Self {
		Self::new(mail_manager, default_template_engine(), file_storage)
	}
}

/// Error surfaced by the dispatcher.
///
/// The message is the message of the underlying error, which is kept as the
/// source.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DispatchError {
	message: String,
	#[source]
	source: MailError,
}

impl DispatchError {
	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn into_inner(self) -> MailError {
		self.source
	}
}

impl From<MailError> for DispatchError {
	fn from(source: MailError) -> Self {
		Self {
			message: source.to_string(),
			source,
		}
	}
}

/// What a submission would send, without sending it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailPreview {
	pub subject: String,
	pub from: String,
	pub to: String,
	pub reply_to: String,
	/// `"yes"` or `"no"`
	pub attach_files: String,
	pub plain_text: String,
	pub html_text: String,
}

/// Sends form data as mail with the settings of one route.
///
/// # Examples
///
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use dmf_mail::{FormData, MailDataDispatcher, MailServices, MemoryMailManager};
/// use dmf_storages::InMemoryStorage;
/// use std::sync::Arc;
///
/// let services = MailServices::with_defaults(
///     Arc::new(MemoryMailManager::new()),
///     Arc::new(InMemoryStorage::new()),
/// );
///
/// let mut data = FormData::new();
/// data.insert("message", "Hello");
///
/// MailDataDispatcher::new(services, "forms@example.com", "sales@example.com", "New lead")
///     .send(&data)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MailDataDispatcher {
	services: MailServices,
	from: AddressInput,
	to: AddressInput,
	reply_to: Option<AddressInput>,
	subject: String,
	attach_uploaded_files: bool,
	plain_template: TemplateConfig,
	html_template: TemplateConfig,
	use_html: bool,
}

impl MailDataDispatcher {
	pub const KEYWORD: &'static str = "mail";

	pub fn new(
		services: MailServices,
		from: impl Into<AddressInput>,
		to: impl Into<AddressInput>,
		subject: impl Into<String>,
	) -> Self {
		Self {
			services,
			from: from.into(),
			to: to.into(),
			reply_to: None,
			subject: subject.into(),
			attach_uploaded_files: false,
			plain_template: TemplateConfig::default(),
			html_template: TemplateConfig::default(),
			use_html: false,
		}
	}

	pub fn with_reply_to(mut self, reply_to: impl Into<AddressInput>) -> Self {
		self.reply_to = Some(reply_to.into());
		self
	}

	/// Attach uploaded files instead of listing them in the body.
	///
	/// Files are read from storage by relative path. A file with no relative
	/// path is attached from its public URL; only local and `file://` URLs
	/// can be read.
	pub fn with_attached_uploads(mut self, attach: bool) -> Self {
		self.attach_uploaded_files = attach;
		self
	}

	pub fn with_plain_template(mut self, template: TemplateConfig) -> Self {
		self.plain_template = template;
		self
	}

	/// HTML body template; only rendered when `use_html` is set.
	pub fn with_html_template(mut self, template: TemplateConfig, use_html: bool) -> Self {
		self.html_template = template;
		self.use_html = use_html;
		self
	}

	pub fn attach_uploaded_files(&self) -> bool {
		self.attach_uploaded_files
	}

	fn compose_input(&self) -> ComposeInput {
		ComposeInput {
			from: self.from.clone(),
			to: self.to.clone(),
			reply_to: self.reply_to.clone(),
			subject: self.subject.clone(),
		}
	}

	/// Render the plain and HTML bodies.
	///
	/// File fields are left out when they are sent as attachments.
	fn render_bodies(&self, data: &FormData) -> MailResult<(String, String)> {
		let body_data = if self.attach_uploaded_files {
			data.without_files()
		} else {
			data.clone()
		};

		let engine = &self.services.template_engine;
		let plain = engine.render(&self.plain_template, TemplateFormat::PlainText, &body_data)?;
		let html = if self.use_html {
			engine.render(&self.html_template, TemplateFormat::Html, &body_data)?
		} else {
			String::new()
		};

		Ok((plain, html))
	}

	async fn collect_attachments(&self, data: &FormData) -> MailResult<Vec<Attachment>> {
		let mut attachments = Vec::new();
		if !self.attach_uploaded_files {
			return Ok(attachments);
		}

		for (field, file) in data.files() {
			// Files known only by URL are read when the message is built.
			let mut attachment = if file.relative_path().is_empty() && !file.public_url().is_empty()
			{
				Attachment::from_reference(file.file_name(), file.public_url())
			} else {
				let content = self.services.file_storage.open(file.relative_path()).await?;
				Attachment::new(file.file_name(), content)
			};
			attachment.with_mime_type(file.mime_type());
			tracing::debug!(
				field,
				file_name = file.file_name(),
				mime_type = attachment.mime_type(),
				"attaching uploaded file"
			);
			attachments.push(attachment);
		}

		Ok(attachments)
	}

	async fn try_send(&self, data: &FormData) -> MailResult<MailMessage> {
		let builder = self.services.mail_manager.create_message();
		let (plain, html) = self.render_bodies(data)?;
		let attachments = self.collect_attachments(data).await?;
		let message = compose_with(builder, &self.compose_input(), &plain, &html, attachments)?;

		self.services.mail_manager.send_message(&message).await?;
		Ok(message)
	}

	/// Render, compose and send the message.
	pub async fn send(&self, data: &FormData) -> Result<(), DispatchError> {
		match self.try_send(data).await {
			Ok(message) => {
				tracing::info!(
					recipients = message.to().len(),
					attachments = message.attachments().len(),
					"form data mailed"
				);
				Ok(())
			}
			Err(e) => {
				tracing::error!(error = %e, "mail dispatch failed");
				Err(e.into())
			}
		}
	}

	/// Compose the message without sending it or reading attachments.
	pub async fn preview(&self, data: &FormData) -> Result<MailPreview, DispatchError> {
		let (plain, html) = self.render_bodies(data)?;
		let message = compose(&self.compose_input(), &plain, &html, Vec::new())?;

		Ok(MailPreview {
			subject: message.subject().to_string(),
			from: join_addresses(message.from()),
			to: join_addresses(message.to()),
			reply_to: join_addresses(message.reply_to()),
			attach_files: if self.attach_uploaded_files { "yes" } else { "no" }.to_string(),
			plain_text: message.plain_body().to_string(),
			html_text: message.html_body().to_string(),
		})
	}
}

fn join_addresses(addresses: &[Address]) -> String {
	addresses
		.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join(", ")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backends::MemoryMailManager;
	use crate::message::AttachmentContent;
	use crate::templates::SimpleTemplateEngine;
	use crate::value::FileValue;
	use dmf_storages::InMemoryStorage;
	use rstest::{fixture, rstest};

	struct Harness {
		manager: Arc<MemoryMailManager>,
		storage: Arc<InMemoryStorage>,
		services: MailServices,
	}

	#[fixture]
	fn harness() -> Harness {
		let manager = Arc::new(MemoryMailManager::new());
		let storage = Arc::new(InMemoryStorage::new());
		let services = MailServices::new(
			manager.clone(),
			Arc::new(SimpleTemplateEngine),
			storage.clone(),
		);
		Harness {
			manager,
			storage,
			services,
		}
	}

	fn form_data() -> FormData {
		let mut data = FormData::new();
		data.insert("name", "Alice");
		data.insert(
			"cv",
			FileValue::new(
				"cv.pdf",
				"uploads/cv.pdf",
				"https://cdn.example.com/cv.pdf",
				"application/pdf",
			),
		);
		data
	}

	fn dispatcher(services: MailServices) -> MailDataDispatcher {
		MailDataDispatcher::new(services, "Forms <forms@example.com>", "sales@example.com", "Lead")
			.with_plain_template(TemplateConfig::new("{{name}} sent {{cv}}"))
	}

	#[rstest]
	#[tokio::test]
	async fn test_send_stores_message(harness: Harness) {
		// Act
		dispatcher(harness.services).send(&form_data()).await.unwrap();

		// Assert
		let messages = harness.manager.messages();
		assert_eq!(messages.len(), 1);
		assert_eq!(
			messages[0].plain_body(),
			"Alice sent https://cdn.example.com/cv.pdf"
		);
		assert!(messages[0].attachments().is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_attachments_replace_file_fields(harness: Harness) {
		// Arrange
		harness
			.storage
			.save("uploads/cv.pdf", b"%PDF-1.7")
			.await
			.unwrap();

		// Act
		dispatcher(harness.services)
			.with_attached_uploads(true)
			.send(&form_data())
			.await
			.unwrap();

		// Assert
		let message = &harness.manager.messages()[0];
		assert_eq!(message.plain_body(), "Alice sent {{cv}}");
		assert_eq!(message.attachments().len(), 1);
		assert_eq!(message.attachments()[0].file_name(), "cv.pdf");
		assert_eq!(message.attachments()[0].mime_type(), "application/pdf");
	}

	#[rstest]
	#[tokio::test]
	async fn test_file_without_storage_path_is_attached_from_url(harness: Harness) {
		// Arrange
		let dir = tempfile::TempDir::with_prefix("mail_test_").unwrap();
		let path = dir.path().join("notes.txt");
		tokio::fs::write(&path, b"notes").await.unwrap();
		let url = format!("file://{}", path.display());
		let mut data = FormData::new();
		data.insert("name", "Alice");
		data.insert("notes", FileValue::new("notes.txt", "", url.clone(), "text/plain"));

		// Act
		dispatcher(harness.services)
			.with_attached_uploads(true)
			.send(&data)
			.await
			.unwrap();

		// Assert
		let message = &harness.manager.messages()[0];
		assert_eq!(message.attachments().len(), 1);
		assert_eq!(message.attachments()[0].file_name(), "notes.txt");
		assert_eq!(message.attachments()[0].mime_type(), "text/plain");
		assert_eq!(
			message.attachments()[0].content(),
			&AttachmentContent::Reference(url)
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_missing_upload_is_dispatch_error(harness: Harness) {
		// Act
		let result = dispatcher(harness.services)
			.with_attached_uploads(true)
			.send(&form_data())
			.await;

		// Assert
		let error = result.unwrap_err();
		assert!(matches!(error.into_inner(), MailError::Storage(_)));
		assert!(harness.manager.is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_dispatch_error_keeps_message(harness: Harness) {
		// Arrange
		let dispatcher = dispatcher(harness.services)
			.with_plain_template(TemplateConfig::default());

		// Act
		let error = dispatcher.send(&FormData::new()).await.unwrap_err();

		// Assert
		assert_eq!(error.to_string(), "email body seems to be empty");
		assert_eq!(error.message(), "email body seems to be empty");
	}

	#[rstest]
	#[tokio::test]
	async fn test_html_rendered_only_when_enabled(harness: Harness) {
		// Arrange
		let template = TemplateConfig::new("<p>{{name}}</p>");
		let without = dispatcher(harness.services.clone())
			.with_html_template(template.clone(), false);
		let with = dispatcher(harness.services).with_html_template(template, true);

		// Act
		let without = without.preview(&form_data()).await.unwrap();
		let with = with.preview(&form_data()).await.unwrap();

		// Assert
		assert_eq!(without.html_text, "");
		assert_eq!(with.html_text, "<p>Alice</p>");
	}

	#[rstest]
	#[tokio::test]
	async fn test_preview_does_not_send(harness: Harness) {
		// Arrange
		let dispatcher = dispatcher(harness.services)
			.with_reply_to("Lead <lead@example.com>")
			.with_attached_uploads(true);

		// Act
		let preview = dispatcher.preview(&form_data()).await.unwrap();

		// Assert
		assert_eq!(
			preview,
			MailPreview {
				subject: "Lead".to_string(),
				from: "Forms <forms@example.com>".to_string(),
				to: "sales@example.com".to_string(),
				reply_to: "Lead <lead@example.com>".to_string(),
				attach_files: "yes".to_string(),
				plain_text: "Alice sent {{cv}}".to_string(),
				html_text: String::new(),
			}
		);
		assert!(harness.manager.is_empty());
	}
}
