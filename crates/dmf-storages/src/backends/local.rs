//! Local file system storage backend implementation.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::config::LocalConfig;
use crate::{Result, StorageBackend, StorageError};

/// Local file system storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
	base_path: PathBuf,
	base_url: Option<String>,
}

impl LocalStorage {
	/// Create a new local storage backend.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::ConfigError` `` if the base path is not an
	/// existing directory.
	pub fn new(config: LocalConfig) -> Result<Self> {
		let base_path = PathBuf::from(config.base_path);

		if !base_path.exists() {
			return Err(StorageError::ConfigError(format!(
				"Base path does not exist: {}",
				base_path.display()
			)));
		}

		if !base_path.is_dir() {
			return Err(StorageError::ConfigError(format!(
				"Base path is not a directory: {}",
				base_path.display()
			)));
		}

		let base_url = config
			.base_url
			.map(|url| url.trim_end_matches('/').to_string());

		Ok(Self {
			base_path,
			base_url,
		})
	}

	/// Base directory all names are resolved against.
	pub fn base_path(&self) -> &Path {
		&self.base_path
	}

	/// Resolve a storage name below the base path.
	///
	/// Absolute names and `..` components are rejected so that form data can
	/// never point outside the storage root.
	fn get_path(&self, name: &str) -> Result<PathBuf> {
		let relative = Path::new(name);
		let escapes = relative
			.components()
			.any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

		if name.is_empty() || escapes {
			return Err(StorageError::InvalidName(name.to_string()));
		}

		Ok(self.base_path.join(relative))
	}

	async fn existing_path(&self, name: &str) -> Result<PathBuf> {
		let path = self.get_path(name)?;

		if !fs::try_exists(&path).await? {
			return Err(StorageError::NotFound(name.to_string()));
		}

		Ok(path)
	}
}

#[async_trait]
impl StorageBackend for LocalStorage {
	async fn save(&self, name: &str, content: &[u8]) -> Result<String> {
		let path = self.get_path(name)?;

		// Create parent directories if they don't exist
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).await?;
		}

		fs::write(&path, content).await?;
		tracing::debug!(name, size = content.len(), "stored file");

		Ok(name.to_string())
	}

	async fn open(&self, name: &str) -> Result<Vec<u8>> {
		let path = self.existing_path(name).await?;
		let content = fs::read(&path).await?;
		Ok(content)
	}

	async fn delete(&self, name: &str) -> Result<()> {
		let path = self.existing_path(name).await?;
		fs::remove_file(&path).await?;
		Ok(())
	}

	async fn exists(&self, name: &str) -> Result<bool> {
		let path = self.get_path(name)?;
		match fs::metadata(&path).await {
			Ok(metadata) => Ok(metadata.is_file()),
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
			Err(err) => Err(err.into()),
		}
	}

	async fn url(&self, name: &str) -> Result<String> {
		let path = self.existing_path(name).await?;

		if let Some(base_url) = &self.base_url {
			return Ok(format!("{}/{}", base_url, name.trim_start_matches('/')));
		}

		let abs_path = fs::canonicalize(&path).await?;
		Ok(format!("file://{}", abs_path.display()))
	}

	async fn size(&self, name: &str) -> Result<u64> {
		let path = self.existing_path(name).await?;
		let metadata = fs::metadata(&path).await?;
		Ok(metadata.len())
	}
}
