//! Request pipelines behind the HTTP surface.
pub mod chart;

pub use chart::{BirthData, ChartService, ComputedChart};
