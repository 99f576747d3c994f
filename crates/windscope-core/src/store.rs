//! ArchiveStore trait - byte retrieval keyed by archive name
//!
//! The engine is written once against this trait; local directories, remote
//! object stores and in-memory fixtures are interchangeable providers.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Name of an archive within a store: `<namespace>/<file>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveName(String);

impl ArchiveName {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Join a namespace and a file name
    pub fn join(namespace: &str, file: &str) -> Self {
        let namespace = namespace.trim_matches('/');
        if namespace.is_empty() {
            Self(file.to_string())
        } else {
            Self(format!("{}/{}", namespace, file))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final path component
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArchiveName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ArchiveName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Read-only byte store for archives
///
/// Providers never write; the engine only checks existence, reads whole
/// archives and lists a namespace when resolving by scan.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Short description for logs (e.g. `fs:/data`)
    fn describe(&self) -> String;

    /// Whether the archive exists
    async fn exists(&self, name: &ArchiveName) -> StoreResult<bool>;

    /// Read the whole archive
    async fn read_all(&self, name: &ArchiveName) -> StoreResult<Bytes>;

    /// List every archive name inside a namespace
    async fn list(&self, namespace: &str) -> StoreResult<Vec<ArchiveName>> {
        let _ = namespace;
        Err(StoreError::NotSupported("list".to_string()))
    }
}
