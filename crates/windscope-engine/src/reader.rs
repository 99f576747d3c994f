//! Archive reader - archive name → XML payloads
//!
//! Fetching is async and goes through the [`ArchiveStore`]; opening the ZIP
//! container and walking its entries is synchronous and is meant to run on a
//! blocking thread. No failure here ever reaches the caller as an error:
//! every outcome is either a payload or a recorded [`Skip`].

use std::io::{Cursor, Read};
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;
use windscope_core::{ArchiveName, ArchiveStore, Skip, SkipCounts, StoreError};
use zip::ZipArchive;

use crate::policy;

/// Fetches archives from a store
#[derive(Clone)]
pub struct ArchiveReader {
    store: Arc<dyn ArchiveStore>,
}

impl ArchiveReader {
    pub fn new(store: Arc<dyn ArchiveStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ArchiveStore> {
        &self.store
    }

    /// Fetch the raw bytes of an archive
    ///
    /// Existence is checked first; `None` means "no data for this archive"
    /// and the reason has been counted.
    pub async fn fetch(&self, name: &ArchiveName, skips: &mut SkipCounts) -> Option<Bytes> {
        match self.store.exists(name).await {
            Ok(true) => {}
            Ok(false) => {
                skip(skips, name, Skip::ArchiveMissing, "not in store");
                return None;
            }
            Err(e) => {
                skip(skips, name, Skip::ArchiveUnreadable, &e.to_string());
                return None;
            }
        }

        match self.store.read_all(name).await {
            Ok(bytes) => Some(bytes),
            Err(StoreError::NotFound(_)) => {
                skip(skips, name, Skip::ArchiveMissing, "vanished before read");
                None
            }
            Err(e) => {
                skip(skips, name, Skip::ArchiveUnreadable, &e.to_string());
                None
            }
        }
    }
}

impl std::fmt::Debug for ArchiveReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("store", &self.store.describe())
            .finish()
    }
}

fn skip(skips: &mut SkipCounts, name: &ArchiveName, reason: Skip, detail: &str) {
    debug!(archive = %name, detail = %detail, "Archive not usable");
    policy::record(skips, name, reason);
}

/// Upper bound on the buffer reserved from an entry's declared size
const MAX_PREALLOC: u64 = 1 << 20;

/// One XML entry of an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlPayload {
    /// Entry name inside the container
    pub entry: String,
    pub bytes: Vec<u8>,
}

/// Lazy sequence of the XML entries of one archive, in container order
///
/// Entries not ending in `.xml` (any case) are passed over. The first entry
/// that cannot be read yields `Err(Skip::ContainerCorrupt)` and ends the
/// sequence.
pub struct XmlEntries {
    archive: ZipArchive<Cursor<Bytes>>,
    next: usize,
    done: bool,
}

impl XmlEntries {
    /// Open archive bytes as a ZIP container
    pub fn open(bytes: Bytes) -> Result<Self, Skip> {
        let archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            debug!(error = %e, "Not a readable ZIP container");
            Skip::ContainerCorrupt
        })?;
        Ok(Self {
            archive,
            next: 0,
            done: false,
        })
    }

    /// Number of entries in the container, XML or not
    pub fn entry_count(&self) -> usize {
        self.archive.len()
    }

    fn read_entry(&mut self, index: usize) -> zip::result::ZipResult<Option<XmlPayload>> {
        let mut file = self.archive.by_index(index)?;
        if file.is_dir() || !is_xml_entry(file.name()) {
            return Ok(None);
        }
        let entry = file.name().to_string();
        let mut bytes = Vec::with_capacity(file.size().min(MAX_PREALLOC) as usize);
        file.read_to_end(&mut bytes)?;
        Ok(Some(XmlPayload { entry, bytes }))
    }
}

impl Iterator for XmlEntries {
    type Item = Result<XmlPayload, Skip>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done && self.next < self.archive.len() {
            let index = self.next;
            self.next += 1;
            match self.read_entry(index) {
                Ok(Some(payload)) => return Some(Ok(payload)),
                Ok(None) => continue,
                Err(e) => {
                    debug!(entry = index, error = %e, "Archive entry unreadable");
                    self.done = true;
                    return Some(Err(Skip::ContainerCorrupt));
                }
            }
        }
        None
    }
}

/// Whether an entry name has the XML extension (case-insensitive)
pub fn is_xml_entry(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".xml")
}
