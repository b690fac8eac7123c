//! Mail composition from route configuration.

use crate::address::{AddressInput, parse_addresses};
use crate::headers::sanitize_header;
use crate::message::{Attachment, MailMessage, MailMessageBuilder};
use crate::{MailError, MailResult};

/// Raw sender, recipient and subject values of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeInput {
	pub from: AddressInput,
	pub to: AddressInput,
	pub reply_to: Option<AddressInput>,
	pub subject: String,
}

impl ComposeInput {
	pub fn new(
		from: impl Into<AddressInput>,
		to: impl Into<AddressInput>,
		subject: impl Into<String>,
	) -> Self {
		Self {
			from: from.into(),
			to: to.into(),
			reply_to: None,
			subject: subject.into(),
		}
	}

	pub fn with_reply_to(mut self, reply_to: impl Into<AddressInput>) -> Self {
		self.reply_to = Some(reply_to.into());
		self
	}
}

/// Compose a message from a fresh builder.
///
/// # Examples
///
/// ```
/// use dmf_mail::{ComposeInput, compose};
///
/// let input = ComposeInput::new("Forms <forms@example.com>", "a@example.com, b@example.com", "New lead");
/// let message = compose(&input, "Hello", "", Vec::new()).unwrap();
///
/// assert_eq!(message.from()[0].to_string(), "Forms <forms@example.com>");
/// assert_eq!(message.to().len(), 2);
/// ```
pub fn compose(
	input: &ComposeInput,
	plain_body: &str,
	html_body: &str,
	attachments: Vec<Attachment>,
) -> MailResult<MailMessage> {
	compose_with(MailMessage::builder(), input, plain_body, html_body, attachments)
}

/// Compose a message starting from a builder handed out by a mail manager.
///
/// The sender and reply-to are parsed as single entries, the recipients as a
/// list. The subject goes through [`sanitize_header`]; an empty result is a
/// composition error, as are empty address lists and two empty bodies.
pub fn compose_with(
	mut builder: MailMessageBuilder,
	input: &ComposeInput,
	plain_body: &str,
	html_body: &str,
	attachments: Vec<Attachment>,
) -> MailResult<MailMessage> {
	let from = parse_addresses(&input.from, true);
	if from.is_empty() {
		return Err(MailError::Composition(format!(
			"no valid sender address in \"{}\"",
			input.from
		)));
	}
	for address in from {
		builder = builder.from(address);
	}

	let to = parse_addresses(&input.to, false);
	if to.is_empty() {
		return Err(MailError::Composition(format!(
			"no valid recipient address in \"{}\"",
			input.to
		)));
	}
	for address in to {
		builder = builder.to(address);
	}

	if let Some(reply_to) = input.reply_to.as_ref().filter(|r| !r.is_empty()) {
		for address in parse_addresses(reply_to, true) {
			builder = builder.reply_to(address);
		}
	}

	if plain_body.is_empty() && html_body.is_empty() {
		return Err(MailError::Composition(
			"email body seems to be empty".to_string(),
		));
	}
	if !html_body.is_empty() {
		builder = builder.html(html_body);
	}
	if !plain_body.is_empty() {
		builder = builder.text(plain_body);
	}

	let subject = sanitize_header(&input.subject);
	if subject.is_empty() {
		return Err(MailError::Composition(
			"email subject is empty or contains illegal characters".to_string(),
		));
	}

	builder.subject(subject).attachments(attachments).build()
}
