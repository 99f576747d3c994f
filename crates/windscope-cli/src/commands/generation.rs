//! Generation command - daily kWh and availability table

use anyhow::Result;
use chrono::NaiveDate;
use windscope_core::GenerationResult;
use windscope_engine::{ArchiveEngine, GenerationRequest};

use super::report_skips;
use crate::output::{GenerationRow, OutputContext};
use crate::Selection;

/// Run a generation query and print one row per turbine-day
pub async fn generation(
    engine: &ArchiveEngine,
    selection: &Selection,
    today: NaiveDate,
    ctx: &OutputContext,
) -> Result<()> {
    let request = GenerationRequest {
        from_date: selection.from.clone(),
        to_date: selection.to.clone(),
        turbines: selection.turbine_ids(),
    };
    let query = request.resolve(engine.registries(), today)?;
    let result = engine.generation(&query).await?;

    ctx.print_result(&rows(&result), &result);
    report_skips(&result.skipped, ctx);
    Ok(())
}

fn rows(result: &GenerationResult) -> Vec<GenerationRow> {
    result
        .days
        .iter()
        .flat_map(|day| {
            result.turbines.iter().map(move |turbine| GenerationRow {
                day: day.clone(),
                turbine: turbine.to_string(),
                generation_kwh: result.generation(day, turbine).unwrap_or_default(),
                availability: result.availability(day, turbine).unwrap_or(100.0),
            })
        })
        .collect()
}
