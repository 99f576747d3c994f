//! Store configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which provider holds the archives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Local directory tree
    Fs(FsConfig),
    /// S3-compatible object store over HTTP
    Http(HttpConfig),
    /// Empty in-memory store
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Fs(FsConfig::default())
    }
}

/// Filesystem store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsConfig {
    /// Directory holding one sub-directory per archive namespace
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("data")
}

/// HTTP object store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Bucket endpoint, e.g. `https://bucket.s3.eu-central-1.amazonaws.com`
    pub base_url: String,
    /// Key prefix prepended to every archive name (e.g. `windfarm/`)
    #[serde(default)]
    pub prefix: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}
