//! Alarm lifecycle for OAMSim
//!
//! Provides the alarm store and the health, fault and log-scan detectors that feed it.

mod monitor;
mod store;

pub use monitor::{
    match_patterns, node_down_description, AlarmMonitor, FaultKind, LogLine, LogPattern,
    LOG_CATALOG, LOG_PATTERNS, RECOVERY_PROBABILITY,
};
pub use store::{AlarmStats, AlarmStore};
