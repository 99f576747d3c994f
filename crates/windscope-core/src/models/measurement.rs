//! Measurement groups extracted from time-series payloads

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::models::ParameterCode;

/// Which of the three values of a data point a series carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationKind {
    Average,
    Min,
    Max,
}

impl AggregationKind {
    pub const ALL: [AggregationKind; 3] = [
        AggregationKind::Average,
        AggregationKind::Min,
        AggregationKind::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationKind::Average => "Average",
            AggregationKind::Min => "Min",
            AggregationKind::Max => "Max",
        }
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Average" => Ok(AggregationKind::Average),
            "Min" => Ok(AggregationKind::Min),
            "Max" => Ok(AggregationKind::Max),
            other => Err(QueryError::UnknownAggregation(other.to_string())),
        }
    }
}

/// One parameter reading inside a measurement group
///
/// Each value is absent when the payload omits it or it is not numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub code: ParameterCode,
    /// The payload carried a `V` text, numeric or not
    pub has_average: bool,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl DataPoint {
    pub fn value(&self, kind: AggregationKind) -> Option<f64> {
        match kind {
            AggregationKind::Average => self.average,
            AggregationKind::Min => self.min,
            AggregationKind::Max => self.max,
        }
    }
}

/// A timestamped bundle of readings (one `MEAN` record)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementGroup {
    /// End of the averaging interval, minute precision
    pub end: NaiveDateTime,
    pub points: Vec<DataPoint>,
}

impl MeasurementGroup {
    /// Data points for one parameter, in payload order
    pub fn points_for<'a>(
        &'a self,
        code: &'a ParameterCode,
    ) -> impl Iterator<Item = &'a DataPoint> + 'a {
        self.points.iter().filter(move |p| &p.code == code)
    }
}
