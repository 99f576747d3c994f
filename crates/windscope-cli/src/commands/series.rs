//! Series command - parameter time series per turbine

use anyhow::Result;
use chrono::NaiveDate;
use windscope_core::SeriesResult;
use windscope_engine::{ArchiveEngine, SeriesRequest};

use super::report_skips;
use crate::output::{OutputContext, SeriesRow};
use crate::Selection;

/// Run a series query and print one row per value
pub async fn series(
    engine: &ArchiveEngine,
    selection: &Selection,
    params: &[String],
    aggs: &[String],
    today: NaiveDate,
    ctx: &OutputContext,
) -> Result<()> {
    let request = SeriesRequest {
        from_date: selection.from.clone(),
        to_date: selection.to.clone(),
        turbines: selection.turbine_ids(),
        parameters: (!params.is_empty()).then(|| params.to_vec()),
        aggregations: (!aggs.is_empty()).then(|| aggs.to_vec()),
    };
    let query = request.resolve(engine.registries(), today)?;
    let result = engine.series(&query).await?;

    ctx.print_result(&rows(&result), &result);
    report_skips(&result.skipped, ctx);
    Ok(())
}

fn rows(result: &SeriesResult) -> Vec<SeriesRow> {
    let mut rows = Vec::new();
    for parameter in &result.parameters {
        for trace in &parameter.traces {
            for (time, value) in trace.times.iter().zip(&trace.values) {
                rows.push(SeriesRow {
                    series: parameter.name.clone(),
                    turbine: trace.turbine.to_string(),
                    time: time.clone(),
                    value: *value,
                });
            }
        }
    }
    rows
}
