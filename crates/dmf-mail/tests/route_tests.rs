//! Mail route integration tests
//!
//! Routes are built from JSON configuration and run against the memory
//! manager and in-memory file storage.

use dmf_mail::{
	DistributorMailInitialization, FileValue, FormData, KeyValueTemplateEngine, MailError,
	MailRoute, MailRouteConfig, MailServices, MailSettings, MemoryMailManager,
};
use dmf_storages::{InMemoryStorage, StorageBackend};
use rstest::{fixture, rstest};
use serde_json::json;
use std::sync::Arc;

struct Harness {
	manager: Arc<MemoryMailManager>,
	storage: Arc<InMemoryStorage>,
	services: MailServices,
}

#[fixture]
fn harness() -> Harness {
	let manager = Arc::new(MemoryMailManager::new());
	let storage = Arc::new(InMemoryStorage::new());
	let services = DistributorMailInitialization::new("forms")
		.with_mail_manager(manager.clone())
		.with_template_engine(Arc::new(KeyValueTemplateEngine::new()))
		.services(&MailSettings::new(), storage.clone())
		.expect("Failed to build services");
	Harness {
		manager,
		storage,
		services,
	}
}

#[fixture]
fn data() -> FormData {
	let mut data = FormData::new();
	data.insert("name", "Alice");
	data.insert("email", "alice@example.com");
	data.insert(
		"cv",
		FileValue::new("cv.pdf", "uploads/cv.pdf", "", "application/pdf"),
	);
	data
}

fn route(config: serde_json::Value) -> MailRoute {
	let config: MailRouteConfig = serde_json::from_value(config).expect("Invalid route config");
	MailRoute::new("contact", config)
}

// ============================================================================
// Send Tests
// ============================================================================

mod send_tests {
	use super::*;

	#[rstest]
	#[tokio::test]
	async fn test_send_with_defaults(harness: Harness, data: FormData) {
		// Arrange
		let route = route(json!({
			"sender": {"email": {"address": "forms@example.com", "name": "Forms"}},
			"recipients": "sales@example.com, Support <support@example.com>",
			"replyTo": {"field": "email"},
		}));

		// Act
		route.send(&harness.services, &data).await.unwrap();

		// Assert
		let message = &harness.manager.messages()[0];
		assert_eq!(message.subject(), "New Form Submission");
		assert_eq!(message.from()[0].to_string(), "Forms <forms@example.com>");
		assert_eq!(message.to().len(), 2);
		assert_eq!(message.reply_to()[0].address(), "alice@example.com");
		assert_eq!(
			message.plain_body(),
			"name = Alice\nemail = alice@example.com\ncv = cv.pdf"
		);
		assert_eq!(message.html_body(), "");
	}

	#[rstest]
	#[tokio::test]
	async fn test_attachments_are_fetched_from_storage(harness: Harness, data: FormData) {
		// Arrange
		harness
			.storage
			.save("uploads/cv.pdf", b"%PDF-1.7")
			.await
			.unwrap();
		let route = route(json!({
			"sender": "forms@example.com",
			"recipients": "sales@example.com",
			"includeAttachmentsInMail": true,
		}));

		// Act
		route.send(&harness.services, &data).await.unwrap();

		// Assert
		let message = &harness.manager.messages()[0];
		assert!(!message.plain_body().contains("cv"));
		assert_eq!(message.attachments().len(), 1);
		assert_eq!(message.attachments()[0].file_name(), "cv.pdf");
		assert_eq!(message.attachments()[0].mime_type(), "application/pdf");
	}

	#[rstest]
	#[tokio::test]
	async fn test_submitted_recipient_list_yields_each_address(harness: Harness) {
		// Arrange
		let data: FormData = serde_json::from_value(json!({
			"name": "Alice",
			"to": ["a@x.com", "Bee <b@x.com>"],
		}))
		.unwrap();
		let route = route(json!({
			"sender": "forms@example.com",
			"recipients": {"field": "to"},
		}));

		// Act
		route.send(&harness.services, &data).await.unwrap();

		// Assert
		let message = &harness.manager.messages()[0];
		assert_eq!(
			message
				.to()
				.iter()
				.map(ToString::to_string)
				.collect::<Vec<_>>(),
			vec!["a@x.com", "Bee <b@x.com>"]
		);
		assert_eq!(message.plain_body(), "name = Alice\nto = a@x.com, Bee <b@x.com>");
	}

	#[rstest]
	#[tokio::test]
	async fn test_fields_allow_list_without_passthrough(harness: Harness, data: FormData) {
		// Arrange
		let route = route(json!({
			"sender": "forms@example.com",
			"recipients": {"field": "email"},
			"passthroughFields": false,
			"fields": ["name"],
		}));

		// Act
		route.send(&harness.services, &data).await.unwrap();

		// Assert
		let message = &harness.manager.messages()[0];
		assert_eq!(message.to()[0].address(), "alice@example.com");
		assert_eq!(message.plain_body(), "name = Alice");
	}

	#[rstest]
	#[tokio::test]
	async fn test_html_body_when_enabled(harness: Harness, data: FormData) {
		// Arrange
		let route = route(json!({
			"sender": "forms@example.com",
			"recipients": "sales@example.com",
			"useHtml": true,
			"htmlTemplate": "<p>{{name}}</p>",
		}));

		// Act
		route.send(&harness.services, &data).await.unwrap();

		// Assert
		let message = &harness.manager.messages()[0];
		assert_eq!(message.html_body(), "<p>Alice</p>");
		assert!(!message.plain_body().is_empty());
	}
}

// ============================================================================
// Error Tests
// ============================================================================

mod error_tests {
	use super::*;

	#[rstest]
	#[case(json!({"recipients": "sales@example.com"}), "sender")]
	#[case(json!({"sender": "forms@example.com"}), "recipients")]
	#[case(json!({"sender": "forms@example.com", "recipients": {"field": "missing"}}), "recipients")]
	#[case(json!({"sender": "forms@example.com", "recipients": "s@x.com", "subject": ""}), "subject")]
	#[case(json!({"sender": {"email": ""}, "recipients": "s@x.com"}), "sender")]
	fn test_empty_required_value_is_configuration_error(
		harness: Harness,
		data: FormData,
		#[case] config: serde_json::Value,
		#[case] name: &str,
	) {
		// Act
		let result = route(config).dispatcher(&harness.services, &data);

		// Assert
		match result {
			Err(MailError::Configuration(msg)) => assert!(msg.contains(name), "{}", msg),
			Err(other) => panic!("Unexpected error: {}", other),
			Ok(_) => panic!("Expected a configuration error"),
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_missing_upload_surfaces_as_dispatch_error(harness: Harness, data: FormData) {
		// Arrange
		let route = route(json!({
			"sender": "forms@example.com",
			"recipients": "sales@example.com",
			"includeAttachmentsInMail": true,
		}));

		// Act
		let error = route.send(&harness.services, &data).await.unwrap_err();

		// Assert
		assert_eq!(error.to_string(), error.message());
		assert!(matches!(error.into_inner(), MailError::Storage(_)));
		assert!(harness.manager.is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_invalid_address_surfaces_transport_message(harness: Harness, data: FormData) {
		// Arrange
		let route = route(json!({
			"sender": "a@x.com, b@x.com",
			"recipients": "sales@example.com",
		}));

		// Act
		let error = route.send(&harness.services, &data).await.unwrap_err();

		// Assert
		assert!(error.message().contains("a@x.com, b@x.com"));
		assert!(matches!(error.into_inner(), MailError::Transport(_)));
	}
}

// ============================================================================
// Preview Tests
// ============================================================================

mod preview_tests {
	use super::*;

	#[rstest]
	#[tokio::test]
	async fn test_preview_serializes_without_sending(harness: Harness, data: FormData) {
		// Arrange
		let route = route(json!({
			"sender": "Forms <forms@example.com>",
			"recipients": "a@x.com, b@x.com",
			"subject": {"constant": "Lead"},
			"includeAttachmentsInMail": true,
		}));

		// Act
		let preview = route.preview(&harness.services, &data).await.unwrap();

		// Assert
		assert_eq!(
			serde_json::to_value(&preview).unwrap(),
			json!({
				"subject": "Lead",
				"from": "Forms <forms@example.com>",
				"to": "a@x.com, b@x.com",
				"replyTo": "",
				"attachFiles": "yes",
				"plainText": "name = Alice\nemail = alice@example.com",
				"htmlText": "",
			})
		);
		assert!(harness.manager.is_empty());
	}
}
