//! Silent-skip policy
//!
//! Archive corruption, partial uploads and malformed fields are expected
//! operating conditions. None of them fail a query; each drops a well-defined
//! unit of work and is counted here so the drop stays observable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A failure below the query boundary and the unit of work it drops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skip {
    /// No archive resolved for a turbine-day: the slot contributes nothing
    ArchiveMissing,
    /// Existence check or byte fetch failed: the archive is treated as missing
    ArchiveUnreadable,
    /// Bytes are not a readable ZIP container, or an entry cannot be read:
    /// the remaining entries of that archive are dropped
    ContainerCorrupt,
    /// An XML entry does not parse or lacks its expected root structure:
    /// that entry is dropped
    PayloadMalformed,
    /// A measurement group has no parseable end timestamp: the group is dropped
    TimestampMalformed,
    /// A numeric field does not parse: only that value is dropped
    ValueMalformed,
    /// A downtime duration does not parse: the rest of that turbine-day's
    /// operation entries are dropped
    DurationMalformed,
    /// A namespace listing failed: the family resolves nothing for this query
    ListingFailed,
}

impl Skip {
    pub const ALL: [Skip; 8] = [
        Skip::ArchiveMissing,
        Skip::ArchiveUnreadable,
        Skip::ContainerCorrupt,
        Skip::PayloadMalformed,
        Skip::TimestampMalformed,
        Skip::ValueMalformed,
        Skip::DurationMalformed,
        Skip::ListingFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Skip::ArchiveMissing => "archive_missing",
            Skip::ArchiveUnreadable => "archive_unreadable",
            Skip::ContainerCorrupt => "container_corrupt",
            Skip::PayloadMalformed => "payload_malformed",
            Skip::TimestampMalformed => "timestamp_malformed",
            Skip::ValueMalformed => "value_malformed",
            Skip::DurationMalformed => "duration_malformed",
            Skip::ListingFailed => "listing_failed",
        }
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-query tally of skipped units of work
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    pub archive_missing: u64,
    pub archive_unreadable: u64,
    pub container_corrupt: u64,
    pub payload_malformed: u64,
    pub timestamp_malformed: u64,
    pub value_malformed: u64,
    pub duration_malformed: u64,
    pub listing_failed: u64,
}

impl SkipCounts {
    pub fn record(&mut self, skip: Skip) {
        *self.slot(skip) += 1;
    }

    pub fn get(&self, skip: Skip) -> u64 {
        match skip {
            Skip::ArchiveMissing => self.archive_missing,
            Skip::ArchiveUnreadable => self.archive_unreadable,
            Skip::ContainerCorrupt => self.container_corrupt,
            Skip::PayloadMalformed => self.payload_malformed,
            Skip::TimestampMalformed => self.timestamp_malformed,
            Skip::ValueMalformed => self.value_malformed,
            Skip::DurationMalformed => self.duration_malformed,
            Skip::ListingFailed => self.listing_failed,
        }
    }

    pub fn merge(&mut self, other: &SkipCounts) {
        self.archive_missing += other.archive_missing;
        self.archive_unreadable += other.archive_unreadable;
        self.container_corrupt += other.container_corrupt;
        self.payload_malformed += other.payload_malformed;
        self.timestamp_malformed += other.timestamp_malformed;
        self.value_malformed += other.value_malformed;
        self.duration_malformed += other.duration_malformed;
        self.listing_failed += other.listing_failed;
    }

    /// Non-zero tallies, in declaration order
    pub fn nonzero(&self) -> impl Iterator<Item = (Skip, u64)> + '_ {
        Skip::ALL
            .into_iter()
            .map(|skip| (skip, self.get(skip)))
            .filter(|(_, count)| *count > 0)
    }

    pub fn total(&self) -> u64 {
        self.archive_missing
            + self.archive_unreadable
            + self.container_corrupt
            + self.payload_malformed
            + self.timestamp_malformed
            + self.value_malformed
            + self.duration_malformed
            + self.listing_failed
    }

    fn slot(&mut self, skip: Skip) -> &mut u64 {
        match skip {
            Skip::ArchiveMissing => &mut self.archive_missing,
            Skip::ArchiveUnreadable => &mut self.archive_unreadable,
            Skip::ContainerCorrupt => &mut self.container_corrupt,
            Skip::PayloadMalformed => &mut self.payload_malformed,
            Skip::TimestampMalformed => &mut self.timestamp_malformed,
            Skip::ValueMalformed => &mut self.value_malformed,
            Skip::DurationMalformed => &mut self.duration_malformed,
            Skip::ListingFailed => &mut self.listing_failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_merge() {
        let mut a = SkipCounts::default();
        a.record(Skip::ArchiveMissing);
        a.record(Skip::ArchiveMissing);
        a.record(Skip::ValueMalformed);

        let mut b = SkipCounts::default();
        b.record(Skip::ContainerCorrupt);
        b.merge(&a);

        assert_eq!(b.get(Skip::ArchiveMissing), 2);
        assert_eq!(b.get(Skip::ContainerCorrupt), 1);
        assert_eq!(b.total(), 4);
        assert_eq!(
            b.nonzero().collect::<Vec<_>>(),
            vec![
                (Skip::ArchiveMissing, 2),
                (Skip::ContainerCorrupt, 1),
                (Skip::ValueMalformed, 1)
            ]
        );
    }
}
