//! windscope-store - Archive store providers
//!
//! This crate provides the [`ArchiveStore`] implementations the engine can
//! run against:
//! - [`FsArchiveStore`] - archives in a local directory tree
//! - [`HttpArchiveStore`] - archives in an S3-compatible object store under a
//!   fixed key prefix
//! - [`MemoryArchiveStore`] - in-memory archives for tests
//!
//! # Example
//!
//! ```ignore
//! use windscope_store::{create_store, StoreConfig};
//!
//! let config = StoreConfig::Fs(FsConfig { root: "data".into() });
//! let store = create_store(&config)?;
//! let exists = store.exists(&"10Min/DB91012_05.01.2024.zip".into()).await?;
//! ```

pub mod config;
pub mod fs;
pub mod http;
pub mod memory;

pub use config::{FsConfig, HttpConfig, StoreConfig};
pub use fs::FsArchiveStore;
pub use http::HttpArchiveStore;
pub use memory::MemoryArchiveStore;

use std::sync::Arc;

pub use windscope_core::{ArchiveName, ArchiveStore, StoreError, StoreResult};

/// Create an archive store based on configuration
pub fn create_store(config: &StoreConfig) -> StoreResult<Arc<dyn ArchiveStore>> {
    match config {
        StoreConfig::Fs(cfg) => Ok(Arc::new(FsArchiveStore::new(&cfg.root))),
        StoreConfig::Http(cfg) => Ok(Arc::new(HttpArchiveStore::new(cfg)?)),
        StoreConfig::Memory => Ok(Arc::new(MemoryArchiveStore::new())),
    }
}
