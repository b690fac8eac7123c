use crate::address::Address;
use crate::headers::is_dirty;
use crate::{MailError, MailResult};

/// Where the bytes of an attachment come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentContent {
	/// Content already loaded into memory.
	Bytes(Vec<u8>),
	/// Local path or `file://` URL read when the message is sent.
	Reference(String),
}

/// Represents a file attachment for a mail message.
///
/// The MIME type is detected from the file name unless set explicitly.
///
/// # Examples
///
/// ```
/// use dmf_mail::Attachment;
///
/// let attachment = Attachment::new("report.pdf", b"%PDF".to_vec());
/// assert_eq!(attachment.file_name(), "report.pdf");
/// assert_eq!(attachment.mime_type(), "application/pdf");
///
/// let unknown = Attachment::new("data.unknownext", vec![1, 2, 3]);
/// assert_eq!(unknown.mime_type(), "application/octet-stream");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
	file_name: String,
	mime_type: String,
	content: AttachmentContent,
}

impl Attachment {
	/// Create an attachment from bytes.
	pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
		Self::with_content(file_name, AttachmentContent::Bytes(content))
	}

	/// Create an attachment whose content is read at send time.
	pub fn from_reference(file_name: impl Into<String>, reference: impl Into<String>) -> Self {
		Self::with_content(file_name, AttachmentContent::Reference(reference.into()))
	}

	fn with_content(file_name: impl Into<String>, content: AttachmentContent) -> Self {
		let file_name = file_name.into();
		let mime_type = Self::detect_mime_type(&file_name);

		Self {
			file_name,
			mime_type,
			content,
		}
	}

	/// Set a custom MIME type
	///
	/// Empty values keep the detected type.
	pub fn with_mime_type(&mut self, mime_type: impl Into<String>) -> &mut Self {
		let mime_type = mime_type.into();
		if !mime_type.is_empty() {
			self.mime_type = mime_type;
		}
		self
	}

	pub fn file_name(&self) -> &str {
		&self.file_name
	}

	pub fn mime_type(&self) -> &str {
		&self.mime_type
	}

	pub fn content(&self) -> &AttachmentContent {
		&self.content
	}

	fn detect_mime_type(file_name: &str) -> String {
		mime_guess::from_path(file_name)
			.first()
			.map(|mime| mime.to_string())
			.unwrap_or_else(|| "application/octet-stream".to_string())
	}
}

/// A composed mail message.
///
/// All fields are private; construction goes through [`MailMessageBuilder`]
/// so that every message has a sender, a recipient, a clean subject and a
/// body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
	from: Vec<Address>,
	to: Vec<Address>,
	reply_to: Vec<Address>,
	subject: String,
	plain_body: String,
	html_body: String,
	attachments: Vec<Attachment>,
}

impl MailMessage {
	/// Create a new builder for constructing a `MailMessage`.
	pub fn builder() -> MailMessageBuilder {
		MailMessageBuilder::default()
	}

	pub fn from(&self) -> &[Address] {
		&self.from
	}

	pub fn to(&self) -> &[Address] {
		&self.to
	}

	pub fn reply_to(&self) -> &[Address] {
		&self.reply_to
	}

	pub fn subject(&self) -> &str {
		&self.subject
	}

	/// Plain text body; empty when the message is HTML only.
	pub fn plain_body(&self) -> &str {
		&self.plain_body
	}

	/// HTML body; empty when the message is plain text only.
	pub fn html_body(&self) -> &str {
		&self.html_body
	}

	pub fn attachments(&self) -> &[Attachment] {
		&self.attachments
	}
}

#[derive(Debug, Clone, Default)]
pub struct MailMessageBuilder {
	from: Vec<Address>,
	to: Vec<Address>,
	reply_to: Vec<Address>,
	subject: String,
	plain_body: String,
	html_body: String,
	attachments: Vec<Attachment>,
}

impl MailMessageBuilder {
	pub fn from(mut self, address: Address) -> Self {
		self.from.push(address);
		self
	}

	pub fn to(mut self, address: Address) -> Self {
		self.to.push(address);
		self
	}

	pub fn reply_to(mut self, address: Address) -> Self {
		self.reply_to.push(address);
		self
	}

	pub fn subject(mut self, subject: impl Into<String>) -> Self {
		self.subject = subject.into();
		self
	}

	pub fn text(mut self, body: impl Into<String>) -> Self {
		self.plain_body = body.into();
		self
	}

	pub fn html(mut self, body: impl Into<String>) -> Self {
		self.html_body = body.into();
		self
	}

	pub fn attachment(mut self, attachment: Attachment) -> Self {
		self.attachments.push(attachment);
		self
	}

	pub fn attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
		self.attachments.extend(attachments);
		self
	}

	/// Build the message.
	///
	/// Fails with a composition error when there is no sender, no recipient,
	/// the subject is empty or unsafe, or both bodies are empty.
	pub fn build(self) -> MailResult<MailMessage> {
		if self.from.is_empty() {
			return Err(MailError::Composition("email sender is empty".to_string()));
		}

		if self.to.is_empty() {
			return Err(MailError::Composition(
				"email recipients are empty".to_string(),
			));
		}

		if self.plain_body.is_empty() && self.html_body.is_empty() {
			return Err(MailError::Composition(
				"email body seems to be empty".to_string(),
			));
		}

		if self.subject.is_empty() || is_dirty(&self.subject) {
			return Err(MailError::Composition(
				"email subject is empty or contains illegal characters".to_string(),
			));
		}

		Ok(MailMessage {
			from: self.from,
			to: self.to,
			reply_to: self.reply_to,
			subject: self.subject,
			plain_body: self.plain_body,
			html_body: self.html_body,
			attachments: self.attachments,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn valid_builder() -> MailMessageBuilder {
		MailMessage::builder()
			.from(Address::new("from@example.com"))
			.to(Address::new("to@example.com"))
			.subject("Hello")
			.text("Body")
	}

	#[rstest]
	fn test_build_valid_message() {
		// Act
		let message = valid_builder()
			.reply_to(Address::new("reply@example.com").with_name("Reply"))
			.build()
			.unwrap();

		// Assert
		assert_eq!(message.from()[0].address(), "from@example.com");
		assert_eq!(message.reply_to()[0].to_string(), "Reply <reply@example.com>");
		assert_eq!(message.plain_body(), "Body");
		assert_eq!(message.html_body(), "");
	}

	#[rstest]
	#[case(MailMessage::builder().to(Address::new("to@example.com")).subject("s").text("b"))]
	#[case(MailMessage::builder().from(Address::new("f@example.com")).subject("s").text("b"))]
	#[case(valid_builder().text(""))]
	#[case(valid_builder().subject(""))]
	#[case(valid_builder().subject("a\r\nBcc: x@y.z"))]
	fn test_build_rejects_incomplete_message(#[case] builder: MailMessageBuilder) {
		// Act
		let result = builder.build();

		// Assert
		assert!(matches!(result, Err(MailError::Composition(_))));
	}

	#[rstest]
	fn test_html_only_message_is_valid() {
		// Act
		let message = valid_builder().text("").html("<p>Hi</p>").build().unwrap();

		// Assert
		assert_eq!(message.html_body(), "<p>Hi</p>");
	}

	#[rstest]
	fn test_custom_mime_type() {
		// Arrange
		let mut attachment = Attachment::new("blob", vec![0]);

		// Act
		attachment.with_mime_type("image/png");
		attachment.with_mime_type("");

		// Assert
		assert_eq!(attachment.mime_type(), "image/png");
	}

	#[rstest]
	fn test_reference_attachment() {
		// Act
		let attachment = Attachment::from_reference("notes.txt", "file:///tmp/notes.txt");

		// Assert
		assert_eq!(attachment.mime_type(), "text/plain");
		assert_eq!(
			attachment.content(),
			&AttachmentContent::Reference("file:///tmp/notes.txt".to_string())
		);
	}
}
