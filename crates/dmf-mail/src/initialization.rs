//! Package initialization: wires the mail route collaborators together.

use dmf_storages::StorageBackend;
use std::sync::Arc;

use crate::MailResult;
use crate::backends::{MailManager, manager_from_settings};
use crate::dispatcher::{MailDataDispatcher, MailServices};
use crate::settings::MailSettings;
use crate::templates::{TemplateEngine, default_template_engine};
use crate::value_source::EmailValueSource;

/// Entry point used by the host to register the mail route.
///
/// # Examples
///
/// ```
/// use dmf_mail::{DistributorMailInitialization, MailSettings, MemoryMailManager};
/// use dmf_storages::InMemoryStorage;
/// use std::sync::Arc;
///
/// let init = DistributorMailInitialization::new("forms")
///     .with_mail_manager(Arc::new(MemoryMailManager::new()));
/// let services = init.services(&MailSettings::new(), Arc::new(InMemoryStorage::new())).unwrap();
///
/// assert_eq!(init.package_name(), "distributor-mail");
/// assert_eq!(init.dispatcher_keyword(), "mail");
/// # let _ = services;
/// ```
#[derive(Clone, Default)]
pub struct DistributorMailInitialization {
	mail_manager: Option<Arc<dyn MailManager>>,
	template_engine: Option<Arc<dyn TemplateEngine>>,
	package_alias: String,
}

impl DistributorMailInitialization {
	pub const PACKAGE_NAME: &'static str = "distributor-mail";
	pub const VERSION: &'static str = "1.0.0";

	pub fn new(package_alias: impl Into<String>) -> Self {
		Self {
			mail_manager: None,
			template_engine: None,
			package_alias: package_alias.into(),
		}
	}

	/// Use this manager instead of the one selected by the settings.
	pub fn with_mail_manager(mut self, manager: Arc<dyn MailManager>) -> Self {
		self.mail_manager = Some(manager);
		self
	}

	pub fn with_template_engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
		self.template_engine = Some(engine);
		self
	}

	pub fn package_name(&self) -> &'static str {
		Self::PACKAGE_NAME
	}

	pub fn version(&self) -> &'static str {
		Self::VERSION
	}

	pub fn package_alias(&self) -> &str {
		&self.package_alias
	}

	pub fn dispatcher_keyword(&self) -> &'static str {
		MailDataDispatcher::KEYWORD
	}

	pub fn value_source_keyword(&self) -> &'static str {
		EmailValueSource::KEYWORD
	}

	/// Build the collaborators of the mail route.
	pub fn services(
		&self,
		settings: &MailSettings,
		file_storage: Arc<dyn StorageBackend>,
	) -> MailResult<MailServices> {
		let mail_manager = match &self.mail_manager {
			Some(manager) => manager.clone(),
			None => manager_from_settings(settings)?,
		};
		let template_engine = self
			.template_engine
			.clone()
			.unwrap_or_else(default_template_engine);

		tracing::debug!(
			package = Self::PACKAGE_NAME,
			alias = %self.package_alias,
			injected_manager = self.mail_manager.is_some(),
			"mail services initialized"
		);

		Ok(MailServices::new(mail_manager, template_engine, file_storage))
	}
}
