//! File storage module.
//!
//! Storage backends for uploaded form files.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dmf::storages::{LocalConfig, StorageConfig, create_storage};
//!
//! let storage = create_storage(StorageConfig::Local(LocalConfig::new("/var/uploads")));
//! ```

pub use dmf_storages::*;
