//! windscope-core - Core traits and types for turbine archive analytics
//!
//! This crate provides the shared vocabulary of the workspace: the domain
//! types produced by queries, the process-lifetime code registries, and the
//! [`ArchiveStore`] contract that every storage provider implements.

pub mod error;
pub mod models;
pub mod registry;
pub mod store;

pub use error::{QueryError, QueryResult, RegistryError, RegistryResult, StoreError, StoreResult};
pub use models::*;
pub use registry::{CodeRegistries, ParameterRegistry, TurbineRegistry};
pub use store::{ArchiveName, ArchiveStore};
