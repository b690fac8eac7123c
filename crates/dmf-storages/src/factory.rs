//! Factory function for creating storage backends.

use crate::backends::{InMemoryStorage, LocalStorage};
use crate::{Result, StorageBackend, StorageConfig};
use std::sync::Arc;

/// Create a storage backend from configuration.
///
/// # Examples
///
/// ```rust
/// use dmf_storages::{create_storage, StorageConfig};
///
/// let storage = create_storage(StorageConfig::Memory).unwrap();
/// # let _ = storage;
/// ```
pub fn create_storage(config: StorageConfig) -> Result<Arc<dyn StorageBackend>> {
	tracing::debug!(backend = %config.backend_type(), "creating storage backend");

	match config {
		StorageConfig::Local(local_config) => {
			let storage = LocalStorage::new(local_config)?;
			Ok(Arc::new(storage))
		}
		StorageConfig::Memory => Ok(Arc::new(InMemoryStorage::new())),
	}
}
