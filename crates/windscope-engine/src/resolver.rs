//! Archive resolver - device code + day → archive name
//!
//! Two strategies are supported:
//! - **exact**: the name is built from the family's pattern; absence is
//!   discovered later by the reader's existence check
//! - **scan**: the family namespace is listed once per query and any `.zip`
//!   whose file name contains both the device code and the `DD.MM.YYYY` day
//!   is accepted

use chrono::NaiveDate;
use tracing::{debug, warn};
use windscope_core::{archive_day, ArchiveName, ArchiveStore, DeviceCode, Skip, SkipCounts};

use crate::config::{ArchiveLayout, ResolveStrategy};

/// The two archive namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFamily {
    /// 10-minute time-series logs
    Series,
    /// Daily statistics logs
    Statistics,
}

impl std::fmt::Display for ArchiveFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveFamily::Series => f.write_str("series"),
            ArchiveFamily::Statistics => f.write_str("statistics"),
        }
    }
}

/// Computes archive names from the configured layout
#[derive(Debug, Clone, Default)]
pub struct ArchiveResolver {
    layout: ArchiveLayout,
}

impl ArchiveResolver {
    pub fn new(layout: ArchiveLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ArchiveLayout {
        &self.layout
    }

    pub fn namespace(&self, family: ArchiveFamily) -> &str {
        match family {
            ArchiveFamily::Series => &self.layout.series_namespace,
            ArchiveFamily::Statistics => &self.layout.stats_namespace,
        }
    }

    fn pattern(&self, family: ArchiveFamily) -> &str {
        match family {
            ArchiveFamily::Series => &self.layout.series_pattern,
            ArchiveFamily::Statistics => &self.layout.stats_pattern,
        }
    }

    /// Expected name of a family's archive under the naming convention
    pub fn expected_name(
        &self,
        family: ArchiveFamily,
        device: &DeviceCode,
        day: NaiveDate,
    ) -> ArchiveName {
        let file = self
            .pattern(family)
            .replace("{device}", device.as_str())
            .replace("{day}", &archive_day(day));
        ArchiveName::join(self.namespace(family), &file)
    }

    pub fn resolve_series_archive(&self, device: &DeviceCode, day: NaiveDate) -> ArchiveName {
        self.expected_name(ArchiveFamily::Series, device, day)
    }

    pub fn resolve_stats_archive(&self, device: &DeviceCode, day: NaiveDate) -> ArchiveName {
        self.expected_name(ArchiveFamily::Statistics, device, day)
    }

    /// Prepare per-query lookups for one family
    ///
    /// With the scan strategy this lists the namespace once; a failed listing
    /// is recorded and leaves the family without candidates for this query.
    pub async fn index(
        &self,
        store: &dyn ArchiveStore,
        family: ArchiveFamily,
        skips: &mut SkipCounts,
    ) -> FamilyIndex {
        let listing = match self.layout.strategy {
            ResolveStrategy::Exact => None,
            ResolveStrategy::Scan => match store.list(self.namespace(family)).await {
                Ok(names) => {
                    debug!(family = %family, archives = names.len(), "Indexed namespace");
                    Some(names)
                }
                Err(e) => {
                    warn!(
                        family = %family,
                        store = %store.describe(),
                        error = %e,
                        "Namespace listing failed; family resolves nothing"
                    );
                    skips.record(Skip::ListingFailed);
                    Some(Vec::new())
                }
            },
        };

        FamilyIndex {
            family,
            resolver: self.clone(),
            listing,
        }
    }
}

/// Whether a listed archive belongs to a device and day
pub fn scan_matches(name: &ArchiveName, device: &DeviceCode, day_key: &str) -> bool {
    let file = name.file_name();
    file.to_lowercase().ends_with(".zip") && file.contains(device.as_str()) && file.contains(day_key)
}

/// Candidate lookup for one family, valid for a single query
#[derive(Debug, Clone)]
pub struct FamilyIndex {
    family: ArchiveFamily,
    resolver: ArchiveResolver,
    /// Namespace listing (scan strategy only)
    listing: Option<Vec<ArchiveName>>,
}

impl FamilyIndex {
    pub fn family(&self) -> ArchiveFamily {
        self.family
    }

    /// Archive names that may hold a device's data for a day, in name order
    pub fn candidates(&self, device: &DeviceCode, day: NaiveDate) -> Vec<ArchiveName> {
        match self.listing {
            None => vec![self.resolver.expected_name(self.family, device, day)],
            Some(ref names) => {
                let day_key = archive_day(day);
                names
                    .iter()
                    .filter(|name| scan_matches(name, device, &day_key))
                    .cloned()
                    .collect()
            }
        }
    }
}
