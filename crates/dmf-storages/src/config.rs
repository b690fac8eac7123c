//! Configuration types for storage backends.

use crate::{Result, StorageError};
use std::env;
use std::str::FromStr;

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
	/// Local file system
	Local,
	/// Process-local memory
	Memory,
}

impl std::fmt::Display for BackendType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			BackendType::Local => write!(f, "Local"),
			BackendType::Memory => write!(f, "Memory"),
		}
	}
}

impl FromStr for BackendType {
	type Err = StorageError;

	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_lowercase().as_str() {
			"local" => Ok(BackendType::Local),
			"memory" => Ok(BackendType::Memory),
			_ => Err(StorageError::ConfigError(format!(
				"Invalid backend type: {}",
				s
			))),
		}
	}
}

/// Configuration for local file system backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalConfig {
	/// Base directory path for file storage
	pub base_path: String,
	/// Public URL prefix for stored files
	pub base_url: Option<String>,
}

impl LocalConfig {
	pub fn new(base_path: impl Into<String>) -> Self {
		Self {
			base_path: base_path.into(),
			base_url: None,
		}
	}

	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into());
		self
	}
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
	Local(LocalConfig),
	Memory,
}

impl StorageConfig {
	/// Load configuration from environment variables.
	///
	/// # Environment Variables
	///
	/// - `STORAGE_BACKEND`: Backend type ("local", "memory")
	///
	/// ## Local Backend
	/// - `LOCAL_STORAGE_PATH`: Base directory path (required)
	/// - `LOCAL_STORAGE_URL`: Public URL prefix (optional)
	pub fn from_env() -> Result<Self> {
		let backend_type = env::var("STORAGE_BACKEND").map_err(|_| {
			StorageError::ConfigError("STORAGE_BACKEND environment variable not set".to_string())
		})?;

		Self::from_lookup(&backend_type, |key| env::var(key).ok())
	}

	fn from_lookup(backend: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
		match backend.parse::<BackendType>()? {
			BackendType::Local => {
				let base_path = lookup("LOCAL_STORAGE_PATH").ok_or_else(|| {
					StorageError::ConfigError(
						"LOCAL_STORAGE_PATH environment variable not set".to_string(),
					)
				})?;
				let base_url = lookup("LOCAL_STORAGE_URL");

				Ok(StorageConfig::Local(LocalConfig {
					base_path,
					base_url,
				}))
			}
			BackendType::Memory => Ok(StorageConfig::Memory),
		}
	}

	/// Backend type selected by this configuration.
	pub fn backend_type(&self) -> BackendType {
		match self {
			StorageConfig::Local(_) => BackendType::Local,
			StorageConfig::Memory => BackendType::Memory,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::collections::HashMap;

	#[rstest]
	#[case("local", BackendType::Local)]
	#[case("LOCAL", BackendType::Local)]
	#[case(" memory ", BackendType::Memory)]
	fn test_backend_type_from_str(#[case] input: &str, #[case] expected: BackendType) {
		// Act
		let parsed = input.parse::<BackendType>().unwrap();

		// Assert
		assert_eq!(parsed, expected);
	}

	#[rstest]
	fn test_unknown_backend_type() {
		// Act
		let result = "s3".parse::<BackendType>();

		// Assert
		assert!(matches!(result, Err(StorageError::ConfigError(_))));
	}

	#[rstest]
	fn test_local_config_from_lookup() {
		// Arrange
		let vars: HashMap<&str, &str> = [
			("LOCAL_STORAGE_PATH", "/var/uploads"),
			("LOCAL_STORAGE_URL", "https://example.com/uploads"),
		]
		.into_iter()
		.collect();

		// Act
		let config =
			StorageConfig::from_lookup("local", |key| vars.get(key).map(|v| v.to_string()))
				.unwrap();

		// Assert
		assert_eq!(
			config,
			StorageConfig::Local(
				LocalConfig::new("/var/uploads").with_base_url("https://example.com/uploads")
			)
		);
	}

	#[rstest]
	fn test_local_config_requires_path() {
		// Act
		let result = StorageConfig::from_lookup("local", |_| None);

		// Assert
		assert!(matches!(result, Err(StorageError::ConfigError(msg)) if msg.contains("LOCAL_STORAGE_PATH")));
	}
}
