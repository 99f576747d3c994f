//! Series query - per (parameter, aggregation, turbine) time series
//!
//! Every (turbine, day) slot is a work item. A work item consumes every
//! series archive resolved for its slot and every XML entry inside them,
//! keeping the values of measurement groups inside the query's instant range.
//! The driver restores slot order, appends into buckets, and sorts each bucket
//! by timestamp before emitting it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDateTime;
use tracing::{debug, info};
use windscope_core::{
    AggregationKind, ArchiveName, DateRange, ParameterCode, ParameterSeries, QueryResult,
    SeriesResult, SkipCounts, TimeSeries, TurbineTrace,
};

use crate::engine::{visit_entries, ArchiveEngine, Slot};
use crate::parser::{decode_payload, is_implausible, parse_readings, ReadingFilter};
use crate::policy::{self, Gathered};
use crate::query::{SeriesQuery, SelectedParameter};
use crate::reader::XmlEntries;
use crate::resolver::{ArchiveFamily, FamilyIndex};

/// One extracted value, addressed by selection indices
#[derive(Debug, Clone, Copy, PartialEq)]
struct SeriesPoint {
    parameter: usize,
    aggregation: usize,
    at: NaiveDateTime,
    value: f64,
}

/// What a work item looks for, shared with blocking decode tasks
#[derive(Debug)]
struct SeriesPlan {
    range: DateRange,
    parameters: Vec<SelectedParameter>,
    aggregations: Vec<AggregationKind>,
    by_code: HashMap<ParameterCode, usize>,
}

impl SeriesPlan {
    fn new(query: &SeriesQuery) -> Self {
        let by_code = query
            .parameters
            .iter()
            .enumerate()
            .map(|(i, p)| (p.code.clone(), i))
            .collect();
        Self {
            range: query.range,
            parameters: query.parameters.clone(),
            aggregations: query.aggregations.clone(),
            by_code,
        }
    }

    /// Extract requested values from one archive's payloads
    fn collect(
        &self,
        archive: &ArchiveName,
        entries: XmlEntries,
        skips: &mut SkipCounts,
    ) -> Vec<SeriesPoint> {
        let mut points = Vec::new();
        let filter = ReadingFilter::new(
            |code: &ParameterCode| self.by_code.contains_key(code),
            &self.aggregations,
        )
        .within(self.range);

        for payload in entries {
            let payload = match payload {
                Ok(payload) => payload,
                Err(skip) => {
                    policy::record(skips, archive, skip);
                    break;
                }
            };
            let text = decode_payload(&payload.bytes);
            let groups = match parse_readings(&text, &filter, skips) {
                Ok(groups) => groups,
                Err(skip) => {
                    debug!(entry = %payload.entry, "Payload dropped");
                    policy::record(skips, archive, skip);
                    continue;
                }
            };

            for group in groups {
                for dp in &group.points {
                    let Some(&parameter) = self.by_code.get(&dp.code) else {
                        continue;
                    };
                    let name = &self.parameters[parameter].name;
                    for (aggregation, kind) in self.aggregations.iter().enumerate() {
                        let Some(value) = dp.value(*kind) else {
                            continue;
                        };
                        if is_implausible(name, value) {
                            continue;
                        }
                        points.push(SeriesPoint {
                            parameter,
                            aggregation,
                            at: group.end,
                            value,
                        });
                    }
                }
            }
        }

        points
    }
}

impl ArchiveEngine {
    /// Multi-parameter time series for a turbine/parameter/aggregation
    /// selection
    ///
    /// Turbines without a device code and parameters without a known code
    /// contribute nothing. Missing or corrupt archives are counted in
    /// `skipped`, never returned as errors.
    pub async fn series(&self, query: &SeriesQuery) -> QueryResult<SeriesResult> {
        self.bounded(self.run_series(query)).await
    }

    async fn run_series(&self, query: &SeriesQuery) -> QueryResult<SeriesResult> {
        let started = Instant::now();
        let mut skipped = SkipCounts::default();
        let days = query.range.days();

        let slots = self.slots(&query.turbines, &days);
        let mut result = SeriesResult {
            parameters: Vec::new(),
            reference: self.reference.clone(),
            skipped: SkipCounts::default(),
        };
        if slots.is_empty() || query.parameters.is_empty() || query.aggregations.is_empty() {
            return Ok(result);
        }

        let index = self
            .resolver
            .index(self.store(), ArchiveFamily::Series, &mut skipped)
            .await;
        let plan = Arc::new(SeriesPlan::new(query));

        let mut gathered = self
            .fan_out(slots, |slot| self.series_slot(&index, plan.clone(), slot))
            .await?;
        gathered.sort_by_key(|(slot, _)| (slot.turbine, slot.day));

        // buckets[parameter][aggregation][turbine]
        let per_turbine = vec![TimeSeries::new(); query.turbines.len()];
        let mut buckets = vec![vec![per_turbine; plan.aggregations.len()]; plan.parameters.len()];
        for (slot, found) in gathered {
            for point in found.merge_into(&mut skipped) {
                buckets[point.parameter][point.aggregation][slot.turbine]
                    .push(point.at, point.value);
            }
        }

        for (parameter, per_aggregation) in plan.parameters.iter().zip(buckets) {
            for (kind, per_turbine) in plan.aggregations.iter().zip(per_aggregation) {
                let traces: Vec<TurbineTrace> = query
                    .turbines
                    .iter()
                    .zip(per_turbine)
                    .filter_map(|(turbine, series)| {
                        TurbineTrace::from_series(turbine.clone(), series)
                    })
                    .collect();
                if traces.is_empty() {
                    continue;
                }
                result.parameters.push(ParameterSeries {
                    name: format!("{} ({})", parameter.name, kind),
                    code: parameter.code.clone(),
                    aggregation: *kind,
                    unit: String::new(),
                    traces,
                });
            }
        }

        result.skipped = skipped;
        info!(
            query = "series",
            turbines = query.turbines.len(),
            days = days.len(),
            series = result.parameters.len(),
            skipped = skipped.total(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Query complete"
        );
        Ok(result)
    }

    async fn series_slot(
        &self,
        index: &FamilyIndex,
        plan: Arc<SeriesPlan>,
        slot: Slot,
    ) -> QueryResult<(Slot, Gathered<Vec<SeriesPoint>>)> {
        let mut skips = SkipCounts::default();
        let mut points = Vec::new();

        for name in self.candidates_or_missing(index, &slot, &mut skips) {
            let Some(bytes) = self.reader.fetch(&name, &mut skips).await else {
                continue;
            };
            let plan = plan.clone();
            let found = visit_entries(name, bytes, move |archive, entries, skips| {
                plan.collect(archive, entries, skips)
            })
            .await?;
            if let Some(found) = found.merge_into(&mut skips) {
                points.extend(found);
            }
        }

        Ok((slot, Gathered::new(points, skips)))
    }
}
