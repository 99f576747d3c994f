//! Power-curve command - wind/power scatter per turbine

use anyhow::Result;
use chrono::NaiveDate;
use windscope_core::PowerCurveResult;
use windscope_engine::{ArchiveEngine, PowerCurveRequest};

use super::report_skips;
use crate::output::{CurveRow, OutputContext, OutputFormat};
use crate::Selection;

pub async fn power_curve(
    engine: &ArchiveEngine,
    selection: &Selection,
    today: NaiveDate,
    ctx: &OutputContext,
) -> Result<()> {
    let request = PowerCurveRequest {
        from_date: selection.from.clone(),
        to_date: selection.to.clone(),
        turbines: selection.turbine_ids(),
    };
    let query = request.resolve(engine.registries(), today)?;
    let result = engine.power_curve(&query).await?;

    ctx.print_result(&rows(&result), &result);
    if let (Some(reference), OutputFormat::Table) = (&result.reference, ctx.format) {
        ctx.info(&format!(
            "Reference curve: {} points (see JSON output)",
            reference.wind.len()
        ));
    }
    report_skips(&result.skipped, ctx);
    Ok(())
}

fn rows(result: &PowerCurveResult) -> Vec<CurveRow> {
    result
        .curves
        .iter()
        .flat_map(|curve| {
            curve.wind.iter().zip(&curve.power).map(move |(wind, power)| CurveRow {
                turbine: curve.turbine.to_string(),
                wind: *wind,
                power: *power,
            })
        })
        .collect()
}
