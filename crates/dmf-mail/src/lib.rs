//! # dmf-mail
//!
//! Email output route for the distributor: captured form data is rendered into
//! a mail message and handed to a mail transport.
//!
//! ## Features
//!
//! ### Address handling
//! - **Address list parser**: turns free-text values such as
//!   `Some Name <a@b.com>, c@d.com` into name/address pairs
//! - **Header sanitization**: subjects carrying CR, LF, FF or ESC are voided
//! - **Display-name encoding**: optional RFC 2047 encoded words for legacy setups
//!
//! ### Message composition
//! - **MailMessage**: validated message model built through a builder
//! - **Composer**: applies the parser and sanitizer to route configuration
//! - **Attachments**: uploaded files pulled from a [`dmf_storages::StorageBackend`]
//!
//! ### Templates
//! - **Simple**: `{{field}}` substitution with HTML escaping
//! - **Key/value**: legacy `name = value` listing of all fields
//! - **Tera**: full Tera templates (feature `tera`)
//!
//! ### Transports
//! - **SMTP**: lettre async SMTP with STARTTLS or TLS
//! - **Sendmail**: local sendmail binary
//! - **File**: `.eml` files for development
//! - **Console**: prints messages to stdout
//! - **Memory**: keeps messages for tests
//!
//! ## Example
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use dmf_mail::{FieldValue, FormData, MailRoute, MailRouteConfig, MailServices, MemoryMailManager};
//! use dmf_storages::InMemoryStorage;
//! use std::sync::Arc;
//!
//! let manager = Arc::new(MemoryMailManager::new());
//! let services = MailServices::with_defaults(manager.clone(), Arc::new(InMemoryStorage::new()));
//!
//! let config: MailRouteConfig = serde_json::from_value(serde_json::json!({
//!     "sender": { "email": { "address": "forms@example.com", "name": "Forms" } },
//!     "recipients": "sales@example.com, Support <support@example.com>",
//!     "subject": "New lead",
//! }))?;
//!
//! let mut data = FormData::new();
//! data.insert("name", FieldValue::from("Alice"));
//!
//! MailRoute::new("contact", config).send(&services, &data).await?;
//! assert_eq!(manager.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod backends;
pub mod composer;
pub mod dispatcher;
pub mod encoding;
pub mod headers;
pub mod initialization;
pub mod message;
pub mod route;
pub mod settings;
pub mod templates;
pub mod value;
pub mod value_source;

use thiserror::Error;

pub use address::{Address, AddressInput, parse_addresses};
pub use backends::{
	ConsoleMailManager, FileMailManager, MailManager, MemoryMailManager, SendmailMailManager,
	SmtpConfig, SmtpMailManager, SmtpSecurity, build_lettre_message, manager_from_settings,
};
pub use composer::{ComposeInput, compose, compose_with};
pub use dispatcher::{DispatchError, MailDataDispatcher, MailPreview, MailServices};
pub use encoding::{NameEncoding, encode_word};
pub use headers::sanitize_header;
pub use initialization::DistributorMailInitialization;
pub use message::{Attachment, AttachmentContent, MailMessage, MailMessageBuilder};
pub use route::{MailRoute, MailRouteConfig};
pub use settings::{MailBackendKind, MailSettings};
pub use templates::{
	KeyValueTemplateEngine, SimpleTemplateEngine, TemplateConfig, TemplateEngine, TemplateFormat,
	default_template_engine, escape_html,
};
#[cfg(feature = "tera")]
pub use templates::TeraTemplateEngine;
pub use value::{EmailValue, FieldValue, FileValue, FormData};
pub use value_source::{EmailValueSource, ValueSource};

#[derive(Debug, Error)]
pub enum MailError {
	#[error("Configuration error: {0}")]
	Configuration(String),

	#[error("{0}")]
	Composition(String),

	#[error("Transport error: {0}")]
	Transport(String),

	#[error("Template error: {0}")]
	Template(String),

	#[error("Storage error: {0}")]
	Storage(#[from] dmf_storages::StorageError),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

pub type MailResult<T> = std::result::Result<T, MailError>;
