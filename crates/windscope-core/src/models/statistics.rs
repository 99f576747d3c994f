//! Daily generation and availability

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{SkipCounts, TurbineId};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Generation and downtime of one turbine on one calendar day
///
/// The default (no statistics archive found) is zero generation and zero
/// downtime, i.e. full availability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStatisticRecord {
    pub generation_kwh: f64,
    pub downtime_seconds: f64,
}

impl DailyStatisticRecord {
    /// `(86400 - downtime) / 86400 * 100`, rounded to 2 decimals with ties
    /// going to the even digit
    ///
    /// Not clamped: downtime above a full day yields a negative value.
    pub fn availability_percent(&self) -> f64 {
        round2((SECONDS_PER_DAY - self.downtime_seconds) / SECONDS_PER_DAY * 100.0)
    }
}

/// Two decimals, halves to even
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Response of a generation/availability query
///
/// Tables are keyed day (`YYYY-MM-DD`) first, then turbine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub days: Vec<String>,
    pub turbines: Vec<TurbineId>,
    pub values: BTreeMap<String, BTreeMap<TurbineId, f64>>,
    pub availability: BTreeMap<String, BTreeMap<TurbineId, f64>>,
    #[serde(default)]
    pub skipped: SkipCounts,
}

impl GenerationResult {
    pub fn generation(&self, day: &str, turbine: &TurbineId) -> Option<f64> {
        self.values.get(day).and_then(|row| row.get(turbine)).copied()
    }

    pub fn availability(&self, day: &str, turbine: &TurbineId) -> Option<f64> {
        self.availability
            .get(day)
            .and_then(|row| row.get(turbine))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_bounds() {
        let none = DailyStatisticRecord::default();
        assert_eq!(none.availability_percent(), 100.0);
        assert_eq!(none.generation_kwh, 0.0);

        let full_day = DailyStatisticRecord {
            generation_kwh: 0.0,
            downtime_seconds: 86_400.0,
        };
        assert_eq!(full_day.availability_percent(), 0.0);
    }

    #[test]
    fn test_availability_rounding() {
        let record = DailyStatisticRecord {
            generation_kwh: 150.5,
            downtime_seconds: 5_400.0,
        };
        assert_eq!(record.availability_percent(), 93.75);

        let odd = DailyStatisticRecord {
            generation_kwh: 0.0,
            downtime_seconds: 1_000.0,
        };
        // 98.8425925... -> 98.84
        assert_eq!(odd.availability_percent(), 98.84);
    }

    #[test]
    fn test_availability_halves_round_to_even() {
        let at = |downtime_seconds: f64| {
            DailyStatisticRecord {
                generation_kwh: 0.0,
                downtime_seconds,
            }
            .availability_percent()
        };
        // 99.625 and 99.125 sit exactly on a half
        assert_eq!(at(324.0), 99.62);
        assert_eq!(at(756.0), 99.12);
        // 99.375 rounds up to the even digit
        assert_eq!(at(540.0), 99.38);
    }

    #[test]
    fn test_availability_is_not_clamped() {
        let record = DailyStatisticRecord {
            generation_kwh: 0.0,
            downtime_seconds: 90_000.0,
        };
        assert!(record.availability_percent() < 0.0);
        assert_eq!(record.availability_percent(), -4.17);
    }
}
