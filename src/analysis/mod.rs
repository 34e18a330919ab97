//! Analysis modules.
//!
//! Aggregates, business commentary, and the dashboard that ties them to a
//! filter selection.

pub mod aggregator;
pub mod commentary;
pub mod dashboard;
pub mod stats;

pub use dashboard::{AnalysisSettings, Dashboard};
