//! End-to-end tests through the `dmf` facade

use dmf::mail::MemoryMailManager;
use dmf::prelude::*;
use dmf::storages::LocalConfig;
use dmf_integration_tests::{memory_services, route};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

#[rstest]
#[tokio::test]
async fn test_form_submission_is_mailed() {
	// Arrange
	let harness = memory_services();
	let route = route(
		"contact",
		json!({
			"sender": {"email": {"address": "forms@example.com", "name": "Forms"}},
			"recipients": {"multi": ["sales@example.com", {"field": "cc"}]},
			"subject": "Contact request",
			"plainTextTemplate": "Message from {{name}}"
		}),
	);
	let mut data = FormData::new();
	data.insert("name", "Alice");
	data.insert("cc", "Team <team@example.com>");

	// Act
	route.send(&harness.services, &data).await.unwrap();

	// Assert
	let messages = harness.manager.messages();
	assert_eq!(messages.len(), 1);
	assert_eq!(messages[0].subject(), "Contact request");
	assert_eq!(messages[0].plain_body(), "Message from Alice");
	assert_eq!(
		messages[0]
			.to()
			.iter()
			.map(ToString::to_string)
			.collect::<Vec<_>>(),
		vec!["sales@example.com", "Team <team@example.com>"]
	);
}

#[rstest]
#[tokio::test]
async fn test_submitted_json_recipients_and_uploads() {
	// Arrange
	let harness = memory_services();
	harness
		.storage
		.save("uploads/cv.pdf", b"%PDF-1.7")
		.await
		.unwrap();
	let data: FormData = serde_json::from_value(json!({
		"name": "Alice",
		"to": ["a@x.com", "b@x.com"],
		"cv": {
			"fileName": "cv.pdf",
			"relativePath": "uploads/cv.pdf",
			"mimeType": "application/pdf"
		},
	}))
	.unwrap();
	let route = route(
		"contact",
		json!({
			"sender": "forms@example.com",
			"recipients": {"field": "to"},
			"includeAttachmentsInMail": true,
		}),
	);

	// Act
	route.send(&harness.services, &data).await.unwrap();

	// Assert
	let message = &harness.manager.messages()[0];
	assert_eq!(message.to().len(), 2);
	assert_eq!(message.to()[1].address(), "b@x.com");
	assert_eq!(message.attachments().len(), 1);
	assert_eq!(message.attachments()[0].mime_type(), "application/pdf");
}

#[rstest]
#[tokio::test]
async fn test_uploads_read_from_local_storage() {
	// Arrange
	let temp_dir = TempDir::with_prefix("mail_test_").expect("Failed to create temp dir");
	let storage = create_storage(StorageConfig::Local(LocalConfig::new(
		temp_dir.path().to_string_lossy(),
	)))
	.unwrap();
	storage.save("uploads/notes.txt", b"notes").await.unwrap();
	let manager = Arc::new(MemoryMailManager::new());
	let services = DistributorMailInitialization::new("forms")
		.with_mail_manager(manager.clone())
		.services(&MailSettings::new(), storage)
		.unwrap();
	let mut data = FormData::new();
	data.insert(
		"notes",
		FileValue::new("notes.txt", "uploads/notes.txt", "", "text/plain"),
	);
	let route = route(
		"contact",
		json!({
			"sender": "forms@example.com",
			"recipients": "sales@example.com",
			"includeAttachmentsInMail": true,
			"plainTextTemplate": "See attachment",
		}),
	);

	// Act
	route.send(&services, &data).await.unwrap();

	// Assert
	let message = &manager.messages()[0];
	assert_eq!(message.attachments()[0].file_name(), "notes.txt");
	assert_eq!(message.plain_body(), "See attachment");
}

#[rstest]
#[tokio::test]
async fn test_route_without_recipients_fails() {
	// Arrange
	let harness = memory_services();
	let route = route("contact", json!({"sender": "forms@example.com"}));

	// Act
	let result = route.send(&harness.services, &FormData::new()).await;

	// Assert
	let error: DispatchError = result.unwrap_err();
	assert!(error.message().contains("recipients"));
}
