//! Wind-speed / active-power scatter data

use serde::{Deserialize, Serialize};

use crate::models::{ReferenceCurve, SkipCounts, TurbineId};

/// One retained (wind speed, active power) sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerCurvePoint {
    pub wind_speed: f64,
    pub active_power: f64,
}

/// Scatter data of one turbine, ascending by wind speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurbineCurve {
    pub turbine: TurbineId,
    pub wind: Vec<f64>,
    pub power: Vec<f64>,
}

impl TurbineCurve {
    /// Sort points by wind speed; `None` when no point was retained
    pub fn from_points(turbine: TurbineId, mut points: Vec<PowerCurvePoint>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        points.sort_by(|a, b| a.wind_speed.total_cmp(&b.wind_speed));
        Some(Self {
            turbine,
            wind: points.iter().map(|p| p.wind_speed).collect(),
            power: points.iter().map(|p| p.active_power).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.wind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wind.is_empty()
    }
}

/// Response of a power-curve query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerCurveResult {
    pub curves: Vec<TurbineCurve>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceCurve>,
    #[serde(default)]
    pub skipped: SkipCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_sorted_by_wind() {
        let points = vec![
            PowerCurvePoint { wind_speed: 7.5, active_power: 900.0 },
            PowerCurvePoint { wind_speed: 4.0, active_power: 120.0 },
            PowerCurvePoint { wind_speed: 11.2, active_power: 2000.0 },
        ];
        let curve = TurbineCurve::from_points("T02".into(), points).unwrap();
        assert_eq!(curve.wind, vec![4.0, 7.5, 11.2]);
        assert_eq!(curve.power, vec![120.0, 900.0, 2000.0]);
    }

    #[test]
    fn test_no_points_no_curve() {
        assert!(TurbineCurve::from_points("T02".into(), Vec::new()).is_none());
    }
}
