//! ArchiveEngine - shared state and fan-out machinery for the three queries
//!
//! The query operations themselves live next to their folding logic:
//! [`series`](crate::series), [`availability`](crate::availability) and
//! [`power_curve`](crate::power_curve).

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};
use windscope_core::{
    ArchiveName, ArchiveStore, CodeRegistries, DeviceCode, QueryError, QueryResult,
    ReferenceCurve, Skip, SkipCounts, TurbineId,
};
use windscope_store::create_store;

use crate::config::{ArchiveLayout, ConfigError, EngineConfig, ExecutionConfig, PowerCurveConfig};
use crate::policy::{self, Gathered};
use crate::reader::{ArchiveReader, XmlEntries};
use crate::reference::load_reference_curve;
use crate::resolver::{ArchiveResolver, FamilyIndex};

/// Query engine over an archive store
///
/// Registries and the reference curve are fixed at construction and only
/// read afterwards, so one engine can serve concurrent queries.
#[derive(Debug, Clone)]
pub struct ArchiveEngine {
    pub(crate) registries: Arc<CodeRegistries>,
    pub(crate) resolver: ArchiveResolver,
    pub(crate) reader: ArchiveReader,
    pub(crate) execution: ExecutionConfig,
    pub(crate) power_curve: PowerCurveConfig,
    pub(crate) reference: Option<ReferenceCurve>,
}

impl ArchiveEngine {
    /// Create an engine with default layout and limits
    pub fn new(store: Arc<dyn ArchiveStore>, registries: Arc<CodeRegistries>) -> Self {
        Self {
            registries,
            resolver: ArchiveResolver::default(),
            reader: ArchiveReader::new(store),
            execution: ExecutionConfig::default(),
            power_curve: PowerCurveConfig::default(),
            reference: None,
        }
    }

    /// Build store, registries and reference curve from configuration
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let store = create_store(&config.store)?;
        let registries = Arc::new(config.registry.load()?);
        let reference = config
            .reference_curve
            .as_deref()
            .and_then(load_reference_curve);

        info!(
            store = %store.describe(),
            strategy = ?config.archives.strategy,
            workers = config.engine.workers,
            reference = reference.is_some(),
            "Archive engine ready"
        );

        Ok(Self::new(store, registries)
            .with_layout(config.archives.clone())
            .with_execution(config.engine.clone())
            .with_power_curve(config.power_curve.clone())
            .with_reference(reference))
    }

    pub fn with_layout(mut self, layout: ArchiveLayout) -> Self {
        self.resolver = ArchiveResolver::new(layout);
        self
    }

    pub fn with_execution(mut self, execution: ExecutionConfig) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_power_curve(mut self, power_curve: PowerCurveConfig) -> Self {
        self.power_curve = power_curve;
        self
    }

    pub fn with_reference(mut self, reference: Option<ReferenceCurve>) -> Self {
        self.reference = reference;
        self
    }

    pub fn registries(&self) -> &CodeRegistries {
        &self.registries
    }

    pub fn resolver(&self) -> &ArchiveResolver {
        &self.resolver
    }

    pub fn reference(&self) -> Option<&ReferenceCurve> {
        self.reference.as_ref()
    }

    pub(crate) fn store(&self) -> &dyn ArchiveStore {
        self.reader.store().as_ref()
    }

    /// Run a whole query under the configured wall-clock budget
    ///
    /// Dropping the inner future on expiry cancels every outstanding fetch.
    pub(crate) async fn bounded<T>(
        &self,
        query: impl Future<Output = QueryResult<T>>,
    ) -> QueryResult<T> {
        match tokio::time::timeout(self.execution.query_timeout(), query).await {
            Ok(result) => result,
            Err(_) => Err(QueryError::Timeout(self.execution.query_timeout_secs)),
        }
    }

    /// Run work items with at most `workers` in flight
    ///
    /// Results come back in completion order; callers restore a fixed order
    /// before folding.
    pub(crate) async fn fan_out<I, F, Fut, T>(&self, items: I, work: F) -> QueryResult<Vec<T>>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = QueryResult<T>>,
    {
        stream::iter(items)
            .map(work)
            .buffer_unordered(self.execution.workers.max(1))
            .try_collect()
            .await
    }
}

/// One (turbine, day) cell of a query grid, by index
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub turbine: usize,
    pub day: usize,
    pub device: DeviceCode,
    pub date: NaiveDate,
}

impl ArchiveEngine {
    /// The turbine × day grid, turbine-major; unmapped turbines have no cells
    pub(crate) fn slots(&self, turbines: &[TurbineId], days: &[NaiveDate]) -> Vec<Slot> {
        let mut slots = Vec::with_capacity(turbines.len() * days.len());
        for (turbine, id) in turbines.iter().enumerate() {
            let Some(device) = self.registries.turbines.device_of(id) else {
                debug!(turbine = %id, "No device code, turbine skipped");
                continue;
            };
            for (day, date) in days.iter().enumerate() {
                slots.push(Slot {
                    turbine,
                    day,
                    device: device.clone(),
                    date: *date,
                });
            }
        }
        slots
    }

    /// Candidate archives of a slot; an empty match is counted as missing
    pub(crate) fn candidates_or_missing(
        &self,
        index: &FamilyIndex,
        slot: &Slot,
        skips: &mut SkipCounts,
    ) -> Vec<ArchiveName> {
        let candidates = index.candidates(&slot.device, slot.date);
        if candidates.is_empty() {
            debug!(
                family = %index.family(),
                device = %slot.device,
                day = %slot.date,
                "No archive resolved"
            );
            skips.record(Skip::ArchiveMissing);
        }
        candidates
    }
}

/// Open an archive and hand its XML entries to `visit` on a blocking thread
///
/// `None` means the bytes were not a readable container (already counted).
pub(crate) async fn visit_entries<T, F>(
    name: ArchiveName,
    bytes: Bytes,
    visit: F,
) -> QueryResult<Gathered<Option<T>>>
where
    T: Send + 'static,
    F: FnOnce(&ArchiveName, XmlEntries, &mut SkipCounts) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut skips = SkipCounts::default();
        let value = match XmlEntries::open(bytes) {
            Ok(entries) => Some(visit(&name, entries, &mut skips)),
            Err(skip) => {
                policy::record(&mut skips, &name, skip);
                None
            }
        };
        Gathered::new(value, skips)
    })
    .await
    .map_err(|e| QueryError::Internal(format!("archive decode task failed: {}", e)))
}
