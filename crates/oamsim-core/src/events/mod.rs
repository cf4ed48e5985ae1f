//! Event simulation for OAMSim
//!
//! Scenario-driven and random event generation, the append-only event log, and the
//! one-shot load-test and failover commands.

mod catalog;
mod generator;
mod log;
mod orchestrator;

use std::time::Duration;

pub use catalog::ScenarioCatalog;
pub use generator::{EventGenerator, RECOVERY_SUCCESS_PROBABILITY};
pub use load_test::{LoadProfile, LoadTestRunner, RESOURCE_EXHAUSTION_PROBABILITY};
pub use log::EventLog;
pub use orchestrator::EventOrchestrator;

/// Simulated delay between generated events
///
/// Pacing only spreads events out in time; emission order never depends on it.
/// A disabled pacer returns immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    enabled: bool,
}

impl Pacer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// A pacer that never sleeps
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sleep for `duration` when pacing is enabled
    pub async fn pause(&self, duration: Duration) {
        if self.enabled && !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    /// Sleep for a fractional number of seconds when pacing is enabled
    pub async fn pause_secs(&self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.pause(Duration::from_secs_f64(seconds)).await;
        }
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(true)
    }
}
