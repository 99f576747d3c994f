//! windscope-engine - Archive resolution, parsing and aggregation
//!
//! Turns per-device, per-day ZIP archives of XML logs into three products:
//!
//! - multi-parameter time series ([`ArchiveEngine::series`])
//! - daily generation and availability tables ([`ArchiveEngine::generation`])
//! - wind/power scatter data ([`ArchiveEngine::power_curve`])
//!
//! # Pipeline
//!
//! ```text
//! query ──► turbine × day grid ──► ArchiveResolver ──► ArchiveReader ──► parser ──► fold
//!                                   (name lookup)      (bytes → XML)     (groups)   (buckets)
//! ```
//!
//! Grid cells are fetched concurrently with a bounded fan-out; every bucket is
//! sorted before it is emitted, so results never depend on fetch order.
//!
//! Failures below the query boundary never surface as errors: a missing or
//! corrupt archive, an unparseable payload or a malformed field drops exactly
//! one unit of work (see [`windscope_core::Skip`]) and is counted in the
//! result's `skipped` tally.

pub mod availability;
pub mod config;
pub mod engine;
pub mod parser;
pub mod policy;
pub mod power_curve;
pub mod query;
pub mod reader;
pub mod reference;
pub mod resolver;
pub mod series;

pub use config::{
    ArchiveLayout, ConfigError, EngineConfig, ExecutionConfig, PowerCurveConfig, RegistryConfig,
    ResolveStrategy,
};
pub use engine::ArchiveEngine;
pub use query::{
    GenerationQuery, GenerationRequest, PowerCurveQuery, PowerCurveRequest, SelectedParameter,
    SeriesQuery, SeriesRequest,
};
pub use reader::{ArchiveReader, XmlEntries, XmlPayload};
pub use resolver::{ArchiveFamily, ArchiveResolver, FamilyIndex};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::engine::ArchiveEngine;
    pub use crate::query::{GenerationRequest, PowerCurveRequest, SeriesRequest};
    pub use windscope_core::{
        AggregationKind, CodeRegistries, DateRange, GenerationResult, PowerCurveResult,
        QueryError, SeriesResult, TurbineId,
    };
}
