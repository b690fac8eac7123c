//! # DMF Distributor Mail
//!
//! Email output route for the digital marketing distributor. Captured form
//! submissions are rendered into mail bodies, composed into a message with
//! sanitized headers and handed to a mail transport.
//!
//! ## Crates
//!
//! - [`mail`]: address parsing, composition, templates, transports and the
//!   mail route (`dmf-mail`)
//! - [`storages`]: uploaded file storage used for attachments (`dmf-storages`)
//!
//! ## Feature Flags
//!
//! - `tera` - Tera-backed body templates
//! - `full` (default) - All features enabled
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use dmf::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = MailSettings::from_env()?;
//!     let storage = create_storage(StorageConfig::from_env()?)?;
//!     let services = DistributorMailInitialization::new("forms").services(&settings, storage)?;
//!
//!     let config: MailRouteConfig = serde_json::from_str(r#"{
//!         "sender": {"email": {"address": "forms@example.com", "name": "Forms"}},
//!         "recipients": "sales@example.com",
//!         "replyTo": {"field": "email"}
//!     }"#)?;
//!
//!     let mut data = FormData::new();
//!     data.insert("email", "alice@example.com");
//!     data.insert("message", "Hello");
//!
//!     MailRoute::new("contact", config).send(&services, &data).await?;
//!     Ok(())
//! }
//! ```

pub mod mail;
pub mod storages;

// Re-export mail route
pub use dmf_mail::{
	Address, Attachment, DispatchError, DistributorMailInitialization, EmailValue, FieldValue,
	FileValue, FormData, MailDataDispatcher, MailError, MailManager, MailMessage, MailPreview,
	MailResult, MailRoute, MailRouteConfig, MailServices, MailSettings, TemplateEngine,
	ValueSource,
};

// Re-export storage
pub use dmf_storages::{InMemoryStorage, LocalStorage, StorageBackend, StorageConfig, StorageError};

// Re-export common external dependencies
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use tokio;

pub mod prelude {
	pub use crate::{
		DispatchError, DistributorMailInitialization, FieldValue, FileValue, FormData,
		MailManager, MailRoute, MailRouteConfig, MailServices, MailSettings, StorageBackend,
		StorageConfig,
	};

	pub use dmf_storages::create_storage;

	// External
	pub use async_trait::async_trait;
	pub use serde::{Deserialize, Serialize};
}
