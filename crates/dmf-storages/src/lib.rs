//! # dmf-storages
//!
//! File storage abstraction for the distributor mail route.
//!
//! Uploaded form files are referenced by a storage-relative path. When a mail
//! route is configured to attach uploaded files, the dispatcher reads the file
//! contents back through a [`StorageBackend`].
//!
//! ## Backends
//!
//! - **Local**: files below a base directory on the local file system
//! - **Memory**: process-local map, used in tests and previews
//!
//! ## Example
//!
//! ```rust,no_run
//! use dmf_storages::{StorageBackend, StorageConfig, create_storage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StorageConfig::from_env()?;
//!     let storage = create_storage(config)?;
//!
//!     storage.save("uploads/cv.pdf", b"%PDF-1.7").await?;
//!     let content = storage.open("uploads/cv.pdf").await?;
//!     assert_eq!(content, b"%PDF-1.7");
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod backends;
pub mod config;
pub mod error;
pub mod factory;

pub use backend::StorageBackend;
pub use backends::{InMemoryStorage, LocalStorage};
pub use config::{BackendType, LocalConfig, StorageConfig};
pub use error::{Result, StorageError};
pub use factory::create_storage;
