//! KPI collection and threshold evaluation for OAMSim
//!
//! Samples are kept in bounded per-(kpi, node) windows. The evaluator only looks at
//! the latest sample of each window.

mod catalog;
mod collector;
mod evaluator;
mod store;

pub use catalog::{default_definitions, RECOVERY_SAMPLE_PROBABILITY};
pub use collector::KpiCollector;
pub use evaluator::{classify, ThresholdEvaluator};
pub use store::{summarize, KpiData, KpiStore, KpiSummaries, KpiWindow, DEFAULT_WINDOW_CAPACITY};
