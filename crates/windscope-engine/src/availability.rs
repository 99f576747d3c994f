//! Generation/availability query - daily tables per turbine
//!
//! For a statistics archive only the first XML entry is read. Resolved
//! candidates are tried in name order until one yields an XML entry; that
//! entry decides the day, whether it parses or not.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, info};
use windscope_core::{
    query_day, ArchiveName, DailyStatisticRecord, GenerationResult, QueryResult, SkipCounts,
    TurbineId,
};

use crate::engine::{visit_entries, ArchiveEngine, Slot};
use crate::parser::{decode_payload, parse_statistics};
use crate::policy::{self, Gathered};
use crate::query::GenerationQuery;
use crate::reader::XmlEntries;
use crate::resolver::{ArchiveFamily, FamilyIndex};

/// What reading one statistics archive produced
#[derive(Debug, Clone, Copy, PartialEq)]
enum StatsOutcome {
    /// No XML entry: the next candidate is tried
    NoPayload,
    /// The first entry was used; `None` when it did not parse
    Used(Option<DailyStatisticRecord>),
}

fn read_first_entry(
    archive: &ArchiveName,
    mut entries: XmlEntries,
    skips: &mut SkipCounts,
) -> StatsOutcome {
    let payload = match entries.next() {
        None => return StatsOutcome::NoPayload,
        Some(Err(skip)) => {
            policy::record(skips, archive, skip);
            return StatsOutcome::NoPayload;
        }
        Some(Ok(payload)) => payload,
    };

    let text = decode_payload(&payload.bytes);
    match parse_statistics(&text, skips) {
        Ok(record) => StatsOutcome::Used(Some(record)),
        Err(skip) => {
            debug!(entry = %payload.entry, "Statistics payload dropped");
            policy::record(skips, archive, skip);
            StatsOutcome::Used(None)
        }
    }
}

impl ArchiveEngine {
    /// Daily generation (kWh) and availability (%) per turbine
    ///
    /// Every requested turbine appears on every day; a turbine-day without a
    /// usable statistics archive reports 0 kWh and 100 %.
    pub async fn generation(&self, query: &GenerationQuery) -> QueryResult<GenerationResult> {
        self.bounded(self.run_generation(query)).await
    }

    async fn run_generation(&self, query: &GenerationQuery) -> QueryResult<GenerationResult> {
        let started = Instant::now();
        let mut skipped = SkipCounts::default();
        let days = query.range.days();
        let day_keys: Vec<String> = days.iter().copied().map(query_day).collect();

        let mut records =
            vec![vec![DailyStatisticRecord::default(); days.len()]; query.turbines.len()];

        let slots = self.slots(&query.turbines, &days);
        if !slots.is_empty() {
            let index = self
                .resolver
                .index(self.store(), ArchiveFamily::Statistics, &mut skipped)
                .await;
            let gathered = self
                .fan_out(slots, |slot| self.statistics_slot(&index, slot))
                .await?;
            for (slot, found) in gathered {
                if let Some(record) = found.merge_into(&mut skipped) {
                    records[slot.turbine][slot.day] = record;
                }
            }
        }

        let mut values = BTreeMap::new();
        let mut availability = BTreeMap::new();
        for (day, key) in day_keys.iter().enumerate() {
            let mut day_values: BTreeMap<TurbineId, f64> = BTreeMap::new();
            let mut day_availability: BTreeMap<TurbineId, f64> = BTreeMap::new();
            for (turbine, id) in query.turbines.iter().enumerate() {
                let record = &records[turbine][day];
                day_values.insert(id.clone(), record.generation_kwh);
                day_availability.insert(id.clone(), record.availability_percent());
            }
            values.insert(key.clone(), day_values);
            availability.insert(key.clone(), day_availability);
        }

        info!(
            query = "generation",
            turbines = query.turbines.len(),
            days = days.len(),
            skipped = skipped.total(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Query complete"
        );

        Ok(GenerationResult {
            days: day_keys,
            turbines: query.turbines.clone(),
            values,
            availability,
            skipped,
        })
    }

    async fn statistics_slot(
        &self,
        index: &FamilyIndex,
        slot: Slot,
    ) -> QueryResult<(Slot, Gathered<Option<DailyStatisticRecord>>)> {
        let mut skips = SkipCounts::default();

        for name in self.candidates_or_missing(index, &slot, &mut skips) {
            let Some(bytes) = self.reader.fetch(&name, &mut skips).await else {
                continue;
            };
            let outcome = visit_entries(name, bytes, read_first_entry)
                .await?
                .merge_into(&mut skips);
            if let Some(StatsOutcome::Used(record)) = outcome {
                return Ok((slot, Gathered::new(record, skips)));
            }
        }

        Ok((slot, Gathered::new(None, skips)))
    }
}
