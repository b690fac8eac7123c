//! Mail managers: the transports that deliver composed messages.
//!
//! Every manager converts a [`MailMessage`] into a lettre [`Message`] before
//! delivery, so address and MIME errors surface the same way regardless of
//! the transport.

use async_trait::async_trait;
use lettre::message::header::{ContentType, HeaderName, HeaderValue};
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{
	AsyncSendmailTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::address::Address;
use crate::encoding::{NameEncoding, encoded_display_name};
use crate::message::{AttachmentContent, MailMessage, MailMessageBuilder};
use crate::settings::{MailBackendKind, MailSettings};
use crate::{MailError, MailResult};

/// Transport collaborator of the mail dispatcher.
#[async_trait]
pub trait MailManager: Send + Sync {
	/// Fresh builder for a message sent through this manager.
	fn create_message(&self) -> MailMessageBuilder {
		MailMessage::builder()
	}

	/// Deliver a message.
	async fn send_message(&self, message: &MailMessage) -> MailResult<()>;
}

/// SMTP connection security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
	/// Plain connection
	#[default]
	None,
	/// Upgrade the connection with STARTTLS
	StartTls,
	/// TLS from the first byte
	Tls,
}

impl FromStr for SmtpSecurity {
	type Err = MailError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"none" | "" => Ok(SmtpSecurity::None),
			"starttls" => Ok(SmtpSecurity::StartTls),
			"tls" | "ssl" => Ok(SmtpSecurity::Tls),
			other => Err(MailError::Configuration(format!(
				"Unknown SMTP security: {}",
				other
			))),
		}
	}
}

/// SMTP server configuration.
///
/// # Examples
///
/// ```
/// use dmf_mail::{SmtpConfig, SmtpSecurity};
/// use std::time::Duration;
///
/// let config = SmtpConfig::new("smtp.example.com", 587)
///     .with_credentials("user".to_string(), "password".to_string())
///     .with_security(SmtpSecurity::StartTls)
///     .with_timeout(Duration::from_secs(30));
/// assert_eq!(config.port, 587);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
	pub host: String,
	pub port: u16,
	pub username: Option<String>,
	pub password: Option<String>,
	pub security: SmtpSecurity,
	pub timeout: Option<Duration>,
}

impl SmtpConfig {
	pub fn new(host: impl Into<String>, port: u16) -> Self {
		Self {
			host: host.into(),
			port,
			username: None,
			password: None,
			security: SmtpSecurity::None,
			timeout: None,
		}
	}

	pub fn with_credentials(mut self, username: String, password: String) -> Self {
		self.username = Some(username);
		self.password = Some(password);
		self
	}

	pub fn with_security(mut self, security: SmtpSecurity) -> Self {
		self.security = security;
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}
}

fn mailbox(address: &Address) -> MailResult<Mailbox> {
	let email = address
		.address()
		.parse::<lettre::Address>()
		.map_err(|e| {
			MailError::Transport(format!(
				"Email \"{}\" does not comply with addr-spec of RFC 2822: {}",
				address.address(),
				e
			))
		})?;
	Ok(Mailbox::new(address.name().map(str::to_string), email))
}

/// Address header written exactly as given, with encoded-word display names.
///
/// The raw value keeps only the addresses, which is all the envelope needs.
fn pre_encoded_address_header(name: &'static str, addresses: &[Address]) -> HeaderValue {
	let raw_value = addresses
		.iter()
		.map(Address::address)
		.collect::<Vec<_>>()
		.join(", ");
	let encoded_value = addresses
		.iter()
		.map(|address| match address.name() {
			Some(display_name) => format!(
				"{} <{}>",
				encoded_display_name(display_name),
				address.address()
			),
			None => address.address().to_string(),
		})
		.collect::<Vec<_>>()
		.join(", ");

	HeaderValue::dangerous_new_pre_encoded(
		HeaderName::new_from_ascii_str(name),
		raw_value,
		encoded_value,
	)
}

async fn attachment_bytes(content: &AttachmentContent) -> MailResult<Vec<u8>> {
	match content {
		AttachmentContent::Bytes(bytes) => Ok(bytes.clone()),
		AttachmentContent::Reference(reference) => {
			if reference.contains("://") && !reference.starts_with("file://") {
				return Err(MailError::Transport(format!(
					"Unsupported attachment reference: {}",
					reference
				)));
			}
			let path = reference.strip_prefix("file://").unwrap_or(reference);
			Ok(tokio::fs::read(path).await?)
		}
	}
}

/// Convert a composed message into a lettre [`Message`].
///
/// Plain and HTML bodies become `multipart/alternative` when both are set;
/// attachments wrap the body in `multipart/mixed`.
pub async fn build_lettre_message(
	message: &MailMessage,
	encoding: NameEncoding,
) -> MailResult<Message> {
	let mut builder = Message::builder();

	for address in message.from() {
		builder = builder.from(mailbox(address)?);
	}
	let sender = match message.from() {
		[first, _, ..] => Some(first),
		_ => None,
	};
	if let Some(first) = sender {
		builder = builder.sender(mailbox(first)?);
	}
	for address in message.to() {
		builder = builder.to(mailbox(address)?);
	}
	for address in message.reply_to() {
		builder = builder.reply_to(mailbox(address)?);
	}

	// lettre would encode an encoded word a second time, so these headers
	// replace the typed ones once every address has been validated.
	if encoding == NameEncoding::EncodedWord {
		let headers = [
			("From", message.from()),
			("To", message.to()),
			("Reply-To", message.reply_to()),
			("Sender", sender.map(std::slice::from_ref).unwrap_or_default()),
		];
		for (name, addresses) in headers {
			if !addresses.is_empty() {
				builder = builder.raw_header(pre_encoded_address_header(name, addresses));
			}
		}
	}
	builder = builder.subject(message.subject());

	enum Body {
		Single(SinglePart),
		Alternative(MultiPart),
	}

	let body = match (message.plain_body(), message.html_body()) {
		("", "") => {
			return Err(MailError::Composition(
				"email body seems to be empty".to_string(),
			));
		}
		(plain, "") => Body::Single(SinglePart::plain(plain.to_string())),
		("", html) => Body::Single(SinglePart::html(html.to_string())),
		(plain, html) => Body::Alternative(MultiPart::alternative_plain_html(
			plain.to_string(),
			html.to_string(),
		)),
	};

	let result = if message.attachments().is_empty() {
		match body {
			Body::Single(part) => builder.singlepart(part),
			Body::Alternative(parts) => builder.multipart(parts),
		}
	} else {
		let mut mixed = match body {
			Body::Single(part) => MultiPart::mixed().singlepart(part),
			Body::Alternative(parts) => MultiPart::mixed().multipart(parts),
		};
		for attachment in message.attachments() {
			let content_type = ContentType::parse(attachment.mime_type()).map_err(|e| {
				MailError::Transport(format!(
					"Invalid MIME type \"{}\" for {}: {}",
					attachment.mime_type(),
					attachment.file_name(),
					e
				))
			})?;
			let bytes = attachment_bytes(attachment.content()).await?;
			mixed = mixed.singlepart(
				lettre::message::Attachment::new(attachment.file_name().to_string())
					.body(bytes, content_type),
			);
		}
		builder.multipart(mixed)
	};

	result.map_err(|e| MailError::Transport(e.to_string()))
}

/// SMTP transport.
pub struct SmtpMailManager {
	config: SmtpConfig,
	transport: AsyncSmtpTransport<Tokio1Executor>,
	name_encoding: NameEncoding,
}

impl SmtpMailManager {
	pub fn new(config: SmtpConfig) -> MailResult<Self> {
		let mut builder = match config.security {
			SmtpSecurity::None => {
				AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
			}
			SmtpSecurity::StartTls => {
				AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
					.map_err(|e| MailError::Configuration(e.to_string()))?
			}
			SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
				.map_err(|e| MailError::Configuration(e.to_string()))?,
		};

		builder = builder.port(config.port);

		if let (Some(username), Some(password)) = (&config.username, &config.password) {
			builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
		}

		if let Some(timeout) = config.timeout {
			builder = builder.timeout(Some(timeout));
		}

		Ok(Self {
			transport: builder.build(),
			config,
			name_encoding: NameEncoding::Raw,
		})
	}

	pub fn with_name_encoding(mut self, encoding: NameEncoding) -> Self {
		self.name_encoding = encoding;
		self
	}

	pub fn config(&self) -> &SmtpConfig {
		&self.config
	}
}

#[async_trait]
impl MailManager for SmtpMailManager {
	async fn send_message(&self, message: &MailMessage) -> MailResult<()> {
		let email = build_lettre_message(message, self.name_encoding).await?;
		self.transport.send(email).await.map_err(|e| {
			tracing::error!(host = %self.config.host, error = %e, "SMTP delivery failed");
			MailError::Transport(e.to_string())
		})?;
		tracing::info!(host = %self.config.host, recipients = message.to().len(), "mail sent via SMTP");
		Ok(())
	}
}

/// Local sendmail binary.
pub struct SendmailMailManager {
	transport: AsyncSendmailTransport<Tokio1Executor>,
	name_encoding: NameEncoding,
}

impl SendmailMailManager {
	/// Use `sendmail` from the `PATH`.
	pub fn new() -> Self {
		Self {
			transport: AsyncSendmailTransport::<Tokio1Executor>::new(),
			name_encoding: NameEncoding::Raw,
		}
	}

	pub fn with_command(command: impl Into<String>) -> Self {
		Self {
			transport: AsyncSendmailTransport::<Tokio1Executor>::new_with_command(command.into()),
			name_encoding: NameEncoding::Raw,
		}
	}

	pub fn with_name_encoding(mut self, encoding: NameEncoding) -> Self {
		self.name_encoding = encoding;
		self
	}
}

impl Default for SendmailMailManager {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl MailManager for SendmailMailManager {
	async fn send_message(&self, message: &MailMessage) -> MailResult<()> {
		let email = build_lettre_message(message, self.name_encoding).await?;
		self.transport.send(email).await.map_err(|e| {
			tracing::error!(error = %e, "sendmail delivery failed");
			MailError::Transport(e.to_string())
		})?;
		Ok(())
	}
}

/// Writes every message as an `.eml` file.
pub struct FileMailManager {
	directory: PathBuf,
	name_encoding: NameEncoding,
	counter: AtomicU64,
}

impl FileMailManager {
	pub fn new(directory: impl Into<PathBuf>) -> Self {
		Self {
			directory: directory.into(),
			name_encoding: NameEncoding::Raw,
			counter: AtomicU64::new(0),
		}
	}

	pub fn with_name_encoding(mut self, encoding: NameEncoding) -> Self {
		self.name_encoding = encoding;
		self
	}

	pub fn directory(&self) -> &PathBuf {
		&self.directory
	}

	fn next_file_name(&self) -> String {
		let sequence = self.counter.fetch_add(1, Ordering::Relaxed);
		format!(
			"{}-{}.eml",
			chrono::Utc::now().format("%Y%m%d-%H%M%S%.6f"),
			sequence
		)
	}
}

#[async_trait]
impl MailManager for FileMailManager {
	async fn send_message(&self, message: &MailMessage) -> MailResult<()> {
		let email = build_lettre_message(message, self.name_encoding).await?;

		tokio::fs::create_dir_all(&self.directory).await?;
		let path = self.directory.join(self.next_file_name());
		tokio::fs::write(&path, email.formatted()).await?;

		tracing::debug!(path = %path.display(), "mail written to file");
		Ok(())
	}
}

/// Prints every message to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMailManager {
	name_encoding: NameEncoding,
}

impl ConsoleMailManager {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_name_encoding(mut self, encoding: NameEncoding) -> Self {
		self.name_encoding = encoding;
		self
	}
}

#[async_trait]
impl MailManager for ConsoleMailManager {
	async fn send_message(&self, message: &MailMessage) -> MailResult<()> {
		let email = build_lettre_message(message, self.name_encoding).await?;
		println!("{}", String::from_utf8_lossy(&email.formatted()));
		println!("{}", "-".repeat(79));
		Ok(())
	}
}

/// Keeps sent messages in memory.
///
/// Messages are still converted for the transport, so invalid addresses fail
/// here the same way they would over SMTP. Clones share the outbox.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailManager {
	messages: Arc<Mutex<Vec<MailMessage>>>,
	name_encoding: NameEncoding,
}

impl MemoryMailManager {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_name_encoding(mut self, encoding: NameEncoding) -> Self {
		self.name_encoding = encoding;
		self
	}

	pub fn messages(&self) -> Vec<MailMessage> {
		self.messages.lock().clone()
	}

	pub fn len(&self) -> usize {
		self.messages.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.messages.lock().is_empty()
	}

	pub fn clear(&self) {
		self.messages.lock().clear();
	}
}

#[async_trait]
impl MailManager for MemoryMailManager {
	async fn send_message(&self, message: &MailMessage) -> MailResult<()> {
		build_lettre_message(message, self.name_encoding).await?;
		self.messages.lock().push(message.clone());
		Ok(())
	}
}

/// Build the mail manager selected by the settings.
///
/// # Examples
///
/// ```
/// use dmf_mail::{MailBackendKind, MailSettings, manager_from_settings};
///
/// let settings = MailSettings::new().with_backend(MailBackendKind::Memory);
/// let manager = manager_from_settings(&settings).unwrap();
/// # let _ = manager;
/// ```
pub fn manager_from_settings(settings: &MailSettings) -> MailResult<Arc<dyn MailManager>> {
	let encoding = settings.name_encoding;

	let manager: Arc<dyn MailManager> = match settings.backend {
		MailBackendKind::Smtp => {
			Arc::new(SmtpMailManager::new(settings.smtp_config())?.with_name_encoding(encoding))
		}
		MailBackendKind::Sendmail => {
			let manager = match &settings.sendmail_command {
				Some(command) => SendmailMailManager::with_command(command.clone()),
				None => SendmailMailManager::new(),
			};
			Arc::new(manager.with_name_encoding(encoding))
		}
		MailBackendKind::File => {
			let directory = settings.file_path.clone().ok_or_else(|| {
				MailError::Configuration("file backend requires file_path".to_string())
			})?;
			Arc::new(FileMailManager::new(directory).with_name_encoding(encoding))
		}
		MailBackendKind::Console => Arc::new(ConsoleMailManager::new().with_name_encoding(encoding)),
		MailBackendKind::Memory => Arc::new(MemoryMailManager::new().with_name_encoding(encoding)),
	};

	tracing::debug!(backend = ?settings.backend, "mail manager created");
	Ok(manager)
}
