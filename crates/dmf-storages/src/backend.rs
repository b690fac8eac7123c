//! Storage backend trait definition.

use crate::Result;
use async_trait::async_trait;

/// Storage backend trait for uploaded form files.
///
/// Names are storage-relative paths such as `uploads/2024/cv.pdf`.
///
/// # Examples
///
/// ```rust,no_run
/// use dmf_storages::{StorageBackend, Result};
///
/// async fn attach(storage: &dyn StorageBackend) -> Result<Vec<u8>> {
///     if storage.exists("uploads/cv.pdf").await? {
///         return storage.open("uploads/cv.pdf").await;
///     }
///     Ok(Vec::new())
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
	/// Save a file and return the name it was stored under.
	async fn save(&self, name: &str, content: &[u8]) -> Result<String>;

	/// Read the full contents of a file.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::NotFound` `` if the file doesn't exist.
	async fn open(&self, name: &str) -> Result<Vec<u8>>;

	/// Delete a file.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::NotFound` `` if the file doesn't exist.
	async fn delete(&self, name: &str) -> Result<()>;

	/// Check whether a file exists.
	async fn exists(&self, name: &str) -> Result<bool>;

	/// Public URL under which the file can be retrieved.
	///
	/// Backends with a configured base URL return `<base_url>/<name>`; the
	/// local backend otherwise falls back to a `file://` URL.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::NotFound` `` if the file doesn't exist.
	async fn url(&self, name: &str) -> Result<String>;

	/// File size in bytes.
	async fn size(&self, name: &str) -> Result<u64>;
}
