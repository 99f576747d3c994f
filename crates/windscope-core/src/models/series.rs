//! Time-series query results

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{AggregationKind, ParameterCode, SkipCounts, TurbineId};

/// Timestamp format used in series output (ISO-8601, no zone)
pub const SERIES_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Points collected for one (parameter, aggregation, turbine) bucket
///
/// Archives do not yield points in order, so a series is only ever emitted
/// through [`TimeSeries::into_sorted`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: Vec<(NaiveDateTime, f64)>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at: NaiveDateTime, value: f64) {
        self.points.push((at, value));
    }

    pub fn extend(&mut self, other: TimeSeries) {
        self.points.extend(other.points);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Stable sort by timestamp; equal timestamps keep collection order
    pub fn into_sorted(mut self) -> Vec<(NaiveDateTime, f64)> {
        self.points.sort_by_key(|(at, _)| *at);
        self.points
    }
}

/// One turbine's line in a parameter chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurbineTrace {
    pub turbine: TurbineId,
    pub times: Vec<String>,
    pub values: Vec<f64>,
}

impl TurbineTrace {
    /// Build a trace from a bucket; `None` when the bucket is empty
    pub fn from_series(turbine: TurbineId, series: TimeSeries) -> Option<Self> {
        if series.is_empty() {
            return None;
        }
        let (times, values): (Vec<String>, Vec<f64>) = series
            .into_sorted()
            .into_iter()
            .map(|(at, v)| (at.format(SERIES_TIMESTAMP_FORMAT).to_string(), v))
            .unzip();
        Some(Self {
            turbine,
            times,
            values,
        })
    }
}

/// All turbine traces for one (parameter, aggregation) selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSeries {
    /// Display label, e.g. `Active Power (Average)`
    pub name: String,
    pub code: ParameterCode,
    pub aggregation: AggregationKind,
    pub unit: String,
    pub traces: Vec<TurbineTrace>,
}

/// Static wind/power reference table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCurve {
    pub wind: Vec<f64>,
    pub power: Vec<f64>,
}

/// Response of a series query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub parameters: Vec<ParameterSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceCurve>,
    #[serde(default)]
    pub skipped: SkipCounts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_trace_sorted_and_formatted() {
        let mut series = TimeSeries::new();
        series.push(at(0, 10), 100.0);
        series.push(at(0, 0), 90.0);
        series.push(at(0, 20), 110.0);

        let trace = TurbineTrace::from_series("T01".into(), series).unwrap();
        assert_eq!(
            trace.times,
            vec![
                "2024-01-05T00:00:00",
                "2024-01-05T00:10:00",
                "2024-01-05T00:20:00"
            ]
        );
        assert_eq!(trace.values, vec![90.0, 100.0, 110.0]);
    }

    #[test]
    fn test_empty_series_yields_no_trace() {
        assert!(TurbineTrace::from_series("T01".into(), TimeSeries::new()).is_none());
    }
}
