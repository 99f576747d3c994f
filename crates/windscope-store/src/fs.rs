//! Filesystem archive store

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};
use windscope_core::{ArchiveName, ArchiveStore, StoreError, StoreResult};

/// Archives stored as files below a root directory
///
/// An archive named `10Min/DB91012_05.01.2024.zip` lives at
/// `<root>/10Min/DB91012_05.01.2024.zip`.
#[derive(Debug, Clone)]
pub struct FsArchiveStore {
    root: PathBuf,
}

impl FsArchiveStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            warn!(root = %root.display(), "Archive root is not a directory; every lookup will miss");
        }
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an archive name to a path, refusing anything that leaves the root
    fn path_of(&self, name: &ArchiveName) -> StoreResult<PathBuf> {
        let relative = Path::new(name.as_str());
        let confined = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !confined {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ArchiveStore for FsArchiveStore {
    fn describe(&self) -> String {
        format!("fs:{}", self.root.display())
    }

    async fn exists(&self, name: &ArchiveName) -> StoreResult<bool> {
        let path = match self.path_of(name) {
            Ok(path) => path,
            Err(_) => return Ok(false),
        };
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn read_all(&self, name: &ArchiveName) -> StoreResult<Bytes> {
        let path = self.path_of(name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn list(&self, namespace: &str) -> StoreResult<Vec<ArchiveName>> {
        let dir = self.path_of(&ArchiveName::new(namespace.trim_matches('/')))?;
        let mut entries = tokio::fs::read_dir(&dir).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(file) = entry.file_name().to_str() {
                names.push(ArchiveName::join(namespace, file));
            } else {
                debug!(path = %entry.path().display(), "Skipping non UTF-8 file name");
            }
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_files() -> (tempfile::TempDir, FsArchiveStore) {
        let dir = tempfile::tempdir().unwrap();
        let ns = dir.path().join("10Min");
        std::fs::create_dir_all(ns.join("nested")).unwrap();
        std::fs::write(ns.join("DB91012_06.01.2024.zip"), b"b").unwrap();
        std::fs::write(ns.join("DB91012_05.01.2024.zip"), b"a").unwrap();
        let store = FsArchiveStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_exists_and_read() {
        let (_dir, store) = store_with_files();
        let name = ArchiveName::from("10Min/DB91012_05.01.2024.zip");

        assert!(store.exists(&name).await.unwrap());
        assert_eq!(store.read_all(&name).await.unwrap(), Bytes::from_static(b"a"));

        let missing = ArchiveName::from("10Min/DB91012_07.01.2024.zip");
        assert!(!store.exists(&missing).await.unwrap());
        assert!(matches!(
            store.read_all(&missing).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_directories_are_not_archives() {
        let (_dir, store) = store_with_files();
        assert!(!store.exists(&"10Min/nested".into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_sorted_files_only() {
        let (_dir, store) = store_with_files();
        let names = store.list("10Min").await.unwrap();
        assert_eq!(
            names,
            vec![
                ArchiveName::from("10Min/DB91012_05.01.2024.zip"),
                ArchiveName::from("10Min/DB91012_06.01.2024.zip"),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_missing_namespace_is_error() {
        let (_dir, store) = store_with_files();
        assert!(store.list("Statistics").await.is_err());
    }

    #[tokio::test]
    async fn test_names_cannot_escape_root() {
        let (_dir, store) = store_with_files();
        let escape = ArchiveName::from("../etc/passwd");
        assert!(!store.exists(&escape).await.unwrap());
        assert!(store.read_all(&escape).await.is_err());
    }
}
