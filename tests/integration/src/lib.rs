//! Integration test utilities for the distributor mail route
//!
//! Builds services through the `dmf` facade with the memory mail manager,
//! so tests can inspect every message a route sends.

use dmf::InMemoryStorage;
use dmf::mail::MemoryMailManager;
use dmf::prelude::*;
use std::sync::Arc;

/// Services wired to an in-memory outbox and in-memory uploads.
pub struct MemoryServices {
	pub manager: Arc<MemoryMailManager>,
	pub storage: Arc<InMemoryStorage>,
	pub services: MailServices,
}

/// Build [`MemoryServices`] with default settings.
pub fn memory_services() -> MemoryServices {
	let manager = Arc::new(MemoryMailManager::new());
	let storage = Arc::new(InMemoryStorage::new());
	let services = DistributorMailInitialization::new("forms")
		.with_mail_manager(manager.clone())
		.services(&MailSettings::new(), storage.clone())
		.expect("Failed to build mail services");
	MemoryServices {
		manager,
		storage,
		services,
	}
}

/// Parse a route configuration from JSON.
pub fn route(name: &str, config: serde_json::Value) -> MailRoute {
	let config: MailRouteConfig = serde_json::from_value(config).expect("Invalid route config");
	MailRoute::new(name, config)
}
