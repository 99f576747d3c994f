//! Registry commands - list turbines and parameters

use windscope_engine::ArchiveEngine;

use crate::output::{OutputContext, ParameterRow, TurbineRow};

/// List turbine ids with their device codes
pub fn turbines(engine: &ArchiveEngine, ctx: &OutputContext) {
    let registry = &engine.registries().turbines;
    let rows: Vec<TurbineRow> = registry
        .ids()
        .into_iter()
        .map(|id| TurbineRow {
            device: registry
                .device_of(&id)
                .map(ToString::to_string)
                .unwrap_or_default(),
            turbine: id.to_string(),
        })
        .collect();
    ctx.print(&rows);
}

/// List parameter codes with their display names, in registry order
pub fn parameters(engine: &ArchiveEngine, ctx: &OutputContext) {
    let rows: Vec<ParameterRow> = engine
        .registries()
        .parameters
        .entries()
        .map(|(code, name)| ParameterRow {
            code: code.to_string(),
            name: name.to_string(),
        })
        .collect();
    ctx.print(&rows);
}
