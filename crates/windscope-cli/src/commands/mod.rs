//! Command implementations for windscope

pub mod generation;
pub mod power_curve;
pub mod registry;
pub mod series;

pub use generation::generation;
pub use power_curve::power_curve;
pub use registry::{parameters, turbines};
pub use series::series;

use windscope_core::SkipCounts;

use crate::output::OutputContext;

/// Warn about work units the query had to drop
pub(crate) fn report_skips(skipped: &SkipCounts, ctx: &OutputContext) {
    for (skip, count) in skipped.nonzero() {
        ctx.warn(&format!("Skipped {} x {}", count, skip));
    }
}
