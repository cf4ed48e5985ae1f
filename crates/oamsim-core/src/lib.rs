//! # OAMSim
//!
//! Telemetry and correlation engine for a simulated 5G core network.
//!
//! OAMSim fabricates node health, alarms, KPI time series and failure/recovery
//! events so that dashboards and other consumers have realistic telemetry to work
//! against. Nothing it reports comes from a live network.
//!
//! ## Architecture
//!
//! - **Registry**: one shared set of nodes and their status
//! - **Alarms**: health checks, fault injection with recovery, log-pattern scans
//! - **KPI**: bounded per-(kpi, node) windows with threshold evaluation
//! - **Events**: scenario-driven and random events, load tests, failover drills
//! - **Engine**: schedules the periodic tasks and serves read-only snapshots
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the engine until Ctrl+C
//! oamsim run
//!
//! # One-shot commands
//! oamsim load-test --node-type UPF --intensity high
//! oamsim failover --node-type AMF
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod alarms;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod kpi;
pub mod models;
pub mod random;
pub mod registry;
pub mod snapshot;

pub use config::Config;
pub use engine::Engine;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::engine::{Engine, EngineStatus};
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
    pub use crate::random::{FixedRandom, RandomSource, SeededRandom};
}
