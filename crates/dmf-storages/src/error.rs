//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors returned by storage backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
	/// The requested file does not exist.
	#[error("file not found: {0}")]
	NotFound(String),

	/// The file name escapes the storage root or is otherwise unusable.
	#[error("invalid file name: {0}")]
	InvalidName(String),

	/// Backend configuration is missing or invalid.
	#[error("storage configuration error: {0}")]
	ConfigError(String),

	/// Underlying I/O failure.
	#[error("storage I/O error: {0}")]
	Io(#[from] std::io::Error),
}
