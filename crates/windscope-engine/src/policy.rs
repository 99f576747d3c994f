//! Skip policy table
//!
//! | Failure                                   | Skip                 | Dropped unit                  |
//! |-------------------------------------------|----------------------|-------------------------------|
//! | no archive for a turbine-day              | `ArchiveMissing`     | the slot                      |
//! | existence check / fetch failed            | `ArchiveUnreadable`  | the archive                   |
//! | not a ZIP, or an entry cannot be read     | `ContainerCorrupt`   | rest of the archive           |
//! | XML not well-formed / no `STATISTIC`      | `PayloadMalformed`   | the entry                     |
//! | `END` missing or not `DD.MM.YYYY HH:MM`   | `TimestampMalformed` | the measurement group         |
//! | numeric field not a number                | `ValueMalformed`     | the value                     |
//! | `TIMELASTDAY` not a duration              | `DurationMalformed`  | remaining operation entries   |
//! | namespace listing failed                  | `ListingFailed`      | the family for this query     |
//!
//! Work items never return errors; they return what they gathered together
//! with the skips they recorded, and the query driver merges both.

use tracing::debug;
use windscope_core::{ArchiveName, Skip, SkipCounts};

/// The unit of work a skip drops
pub fn dropped_unit(skip: Skip) -> &'static str {
    match skip {
        Skip::ArchiveMissing => "slot",
        Skip::ArchiveUnreadable => "archive",
        Skip::ContainerCorrupt => "remaining entries",
        Skip::PayloadMalformed => "entry",
        Skip::TimestampMalformed => "measurement group",
        Skip::ValueMalformed => "value",
        Skip::DurationMalformed => "remaining operations",
        Skip::ListingFailed => "family",
    }
}

/// Count a skip against an archive and log it
pub fn record(skips: &mut SkipCounts, archive: &ArchiveName, skip: Skip) {
    debug!(
        archive = %archive,
        reason = %skip,
        dropped = dropped_unit(skip),
        "Skipped"
    );
    skips.record(skip);
}

/// Output of one work item plus the skips it recorded
#[derive(Debug, Clone, Default)]
pub struct Gathered<T> {
    pub value: T,
    pub skips: SkipCounts,
}

impl<T> Gathered<T> {
    pub fn new(value: T, skips: SkipCounts) -> Self {
        Self { value, skips }
    }

    /// Move the skips into a query-wide tally and return the value
    pub fn merge_into(self, total: &mut SkipCounts) -> T {
        total.merge(&self.skips);
        self.value
    }
}
