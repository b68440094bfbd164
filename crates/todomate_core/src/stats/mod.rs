//! Weekly statistics: aggregation, summaries, and dashboard state.

pub mod aggregate;
pub mod dashboard;
pub mod summary;
