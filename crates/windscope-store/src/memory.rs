//! In-memory archive store for testing

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use windscope_core::{ArchiveName, ArchiveStore, StoreError, StoreResult};

/// Archive store backed by a map, with failure injection
#[derive(Debug, Default)]
pub struct MemoryArchiveStore {
    archives: RwLock<BTreeMap<ArchiveName, Bytes>>,
    /// Archives whose reads fail with an I/O error
    broken: RwLock<HashSet<ArchiveName>>,
    /// Number of `read_all` calls served
    reads: AtomicU64,
}

impl MemoryArchiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an archive
    pub fn insert(&self, name: impl Into<ArchiveName>, data: impl Into<Bytes>) {
        self.archives.write().insert(name.into(), data.into());
    }

    pub fn remove(&self, name: &ArchiveName) -> Option<Bytes> {
        self.archives.write().remove(name)
    }

    /// Make reads of an existing archive fail (simulates a partial upload
    /// or an unreachable object)
    pub fn break_reads(&self, name: impl Into<ArchiveName>) {
        self.broken.write().insert(name.into());
    }

    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.archives.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.read().is_empty()
    }
}

#[async_trait]
impl ArchiveStore for MemoryArchiveStore {
    fn describe(&self) -> String {
        format!("memory:{} archives", self.len())
    }

    async fn exists(&self, name: &ArchiveName) -> StoreResult<bool> {
        Ok(self.archives.read().contains_key(name))
    }

    async fn read_all(&self, name: &ArchiveName) -> StoreResult<Bytes> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.broken.read().contains(name) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("injected read failure for {}", name),
            )));
        }
        self.archives
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn list(&self, namespace: &str) -> StoreResult<Vec<ArchiveName>> {
        let prefix = format!("{}/", namespace.trim_matches('/'));
        Ok(self
            .archives
            .read()
            .keys()
            .filter(|name| {
                name.as_str()
                    .strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.contains('/'))
            })
            .cloned()
            .collect())
    }
}
