//! Shared data models for archive queries

mod ids;
mod measurement;
mod power_curve;
mod range;
mod series;
mod skip;
mod statistics;

pub use ids::*;
pub use measurement::*;
pub use power_curve::*;
pub use range::*;
pub use series::*;
pub use skip::*;
pub use statistics::*;
