//! In-memory storage backend.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{Result, StorageBackend, StorageError};

/// Process-local storage keeping file contents in a map.
///
/// Clones share the same underlying map.
///
/// # Examples
///
/// ```
/// use dmf_storages::{InMemoryStorage, StorageBackend};
///
/// # #[tokio::main]
/// # async fn main() -> dmf_storages::Result<()> {
/// let storage = InMemoryStorage::new();
/// storage.save("a.txt", b"hello").await?;
/// assert_eq!(storage.open("a.txt").await?, b"hello");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
	files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
	base_url: Option<String>,
}

impl InMemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}

	/// Use `<base_url>/<name>` as the public URL of stored files.
	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		let base_url = base_url.into();
		self.base_url = Some(base_url.trim_end_matches('/').to_string());
		self
	}

	/// Number of stored files.
	pub fn len(&self) -> usize {
		self.files.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.files.read().is_empty()
	}
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
	async fn save(&self, name: &str, content: &[u8]) -> Result<String> {
		if name.is_empty() {
			return Err(StorageError::InvalidName(name.to_string()));
		}
		self.files.write().insert(name.to_string(), content.to_vec());
		Ok(name.to_string())
	}

	async fn open(&self, name: &str) -> Result<Vec<u8>> {
		self.files
			.read()
			.get(name)
			.cloned()
			.ok_or_else(|| StorageError::NotFound(name.to_string()))
	}

	async fn delete(&self, name: &str) -> Result<()> {
		self.files
			.write()
			.remove(name)
			.map(|_| ())
			.ok_or_else(|| StorageError::NotFound(name.to_string()))
	}

	async fn exists(&self, name: &str) -> Result<bool> {
		Ok(self.files.read().contains_key(name))
	}

	async fn url(&self, name: &str) -> Result<String> {
		if !self.files.read().contains_key(name) {
			return Err(StorageError::NotFound(name.to_string()));
		}

		Ok(match &self.base_url {
			Some(base_url) => format!("{}/{}", base_url, name),
			None => format!("memory://{}", name),
		})
	}

	async fn size(&self, name: &str) -> Result<u64> {
		self.files
			.read()
			.get(name)
			.map(|content| content.len() as u64)
			.ok_or_else(|| StorageError::NotFound(name.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_clones_share_files() {
		// Arrange
		let storage = InMemoryStorage::new();
		let clone = storage.clone();

		// Act
		storage.save("shared.txt", b"shared").await.unwrap();

		// Assert
		assert_eq!(clone.open("shared.txt").await.unwrap(), b"shared");
		assert_eq!(clone.len(), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_url_without_base_url() {
		// Arrange
		let storage = InMemoryStorage::new();
		storage.save("a.txt", b"a").await.unwrap();

		// Act
		let url = storage.url("a.txt").await.unwrap();

		// Assert
		assert_eq!(url, "memory://a.txt");
	}

	#[rstest]
	#[tokio::test]
	async fn test_open_missing_file() {
		// Arrange
		let storage = InMemoryStorage::new();

		// Act
		let result = storage.open("missing.txt").await;

		// Assert
		assert!(matches!(result, Err(StorageError::NotFound(name)) if name == "missing.txt"));
	}
}
