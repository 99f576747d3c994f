//! Query inputs
//!
//! Requests arrive with every field optional, as a response layer would
//! deserialize them. Resolving a request against the registries and a
//! reference "today" fills in defaults and validates input:
//!
//! | Field          | Default                                 |
//! |----------------|-----------------------------------------|
//! | `from_date`    | yesterday                               |
//! | `to_date`      | yesterday                               |
//! | `turbines`     | every known turbine id, sorted          |
//! | `parameters`   | every known parameter, registry order   |
//! | `aggregations` | `["Average"]`                           |

use std::collections::HashSet;
use std::hash::Hash;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use windscope_core::{
    parse_query_date, AggregationKind, CodeRegistries, DateRange, ParameterCode, QueryResult,
    TurbineId,
};

/// Series query as received
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turbines: Option<Vec<TurbineId>>,
    /// Parameter display names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<String>>,
    /// Aggregation kind names (`Average`, `Min`, `Max`)
    #[serde(default, alias = "agg", skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Vec<String>>,
}

/// Generation/availability query as received
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turbines: Option<Vec<TurbineId>>,
}

/// Power-curve query as received
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerCurveRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turbines: Option<Vec<TurbineId>>,
}

/// A selected parameter with its display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedParameter {
    pub code: ParameterCode,
    pub name: String,
}

/// Validated series query
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesQuery {
    pub range: DateRange,
    pub turbines: Vec<TurbineId>,
    pub parameters: Vec<SelectedParameter>,
    pub aggregations: Vec<AggregationKind>,
}

/// Validated generation/availability query
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationQuery {
    pub range: DateRange,
    pub turbines: Vec<TurbineId>,
}

/// Validated power-curve query
#[derive(Debug, Clone, PartialEq)]
pub struct PowerCurveQuery {
    pub range: DateRange,
    pub turbines: Vec<TurbineId>,
}

impl SeriesRequest {
    /// Apply defaults and translate names to codes
    ///
    /// Parameter names without a code are dropped; an unknown aggregation
    /// name or a malformed date is a client error.
    pub fn resolve(&self, registries: &CodeRegistries, today: NaiveDate) -> QueryResult<SeriesQuery> {
        let range = resolve_range(self.from_date.as_deref(), self.to_date.as_deref(), today)?;
        let turbines = resolve_turbines(self.turbines.as_deref(), registries);

        let names = match self.parameters {
            Some(ref names) => names.clone(),
            None => registries.parameters.names(),
        };
        let parameters = unique(names)
            .into_iter()
            .filter_map(|name| {
                let code = registries.parameters.code_of(&name)?.clone();
                Some(SelectedParameter { code, name })
            })
            .collect();

        let aggregations = match self.aggregations {
            Some(ref kinds) => unique(
                kinds
                    .iter()
                    .map(|k| k.parse::<AggregationKind>())
                    .collect::<QueryResult<Vec<_>>>()?,
            ),
            None => vec![AggregationKind::Average],
        };

        Ok(SeriesQuery {
            range,
            turbines,
            parameters,
            aggregations,
        })
    }
}

impl GenerationRequest {
    pub fn resolve(
        &self,
        registries: &CodeRegistries,
        today: NaiveDate,
    ) -> QueryResult<GenerationQuery> {
        Ok(GenerationQuery {
            range: resolve_range(self.from_date.as_deref(), self.to_date.as_deref(), today)?,
            turbines: resolve_turbines(self.turbines.as_deref(), registries),
        })
    }
}

impl PowerCurveRequest {
    pub fn resolve(
        &self,
        registries: &CodeRegistries,
        today: NaiveDate,
    ) -> QueryResult<PowerCurveQuery> {
        Ok(PowerCurveQuery {
            range: resolve_range(self.from_date.as_deref(), self.to_date.as_deref(), today)?,
            turbines: resolve_turbines(self.turbines.as_deref(), registries),
        })
    }
}

/// The day before `today`
pub fn yesterday(today: NaiveDate) -> NaiveDate {
    today.checked_sub_days(Days::new(1)).unwrap_or(today)
}

fn resolve_range(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> QueryResult<DateRange> {
    let fallback = yesterday(today);
    let start = from.map(parse_query_date).transpose()?.unwrap_or(fallback);
    let end = to.map(parse_query_date).transpose()?.unwrap_or(fallback);
    Ok(DateRange::new(start, end))
}

fn resolve_turbines(requested: Option<&[TurbineId]>, registries: &CodeRegistries) -> Vec<TurbineId> {
    match requested {
        Some(ids) => unique(ids.to_vec()),
        None => registries.turbines.ids(),
    }
}

/// Drop repeated items, keeping first occurrences in order
fn unique<T: Clone + Eq + Hash>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
