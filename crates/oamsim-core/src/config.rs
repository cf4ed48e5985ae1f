//! Configuration management for OAMSim
//!
//! Settings are layered: built-in defaults, then an optional config file, then
//! `OAMSIM__SECTION__KEY` environment variables.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::kpi::DEFAULT_WINDOW_CAPACITY;
use crate::models::{default_topology, Node};

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Simulated topology
    pub nodes: Vec<Node>,

    /// Alarm detector configuration
    pub alarms: AlarmConfig,

    /// KPI collection configuration
    pub kpi: KpiConfig,

    /// Event simulation configuration
    pub events: EventConfig,

    /// Engine supervision configuration
    pub engine: EngineConfig,

    /// Snapshot writer configuration
    pub snapshot: SnapshotConfig,

    /// Prometheus exporter configuration
    pub metrics: MetricsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nodes: default_topology(),
            alarms: AlarmConfig::default(),
            kpi: KpiConfig::default(),
            events: EventConfig::default(),
            engine: EngineConfig::default(),
            snapshot: SnapshotConfig::default(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load defaults, overlay `path` when given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let config: Self = builder
            .add_source(
                config::Environment::with_prefix("OAMSIM")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::config("topology must contain at least one node"));
        }
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(Error::config(format!("duplicate node id '{}'", node.id)));
            }
        }

        let intervals = [
            ("alarms.health_check_interval", self.alarms.health_check_interval),
            ("alarms.fault_interval", self.alarms.fault_interval),
            ("alarms.log_scan_interval", self.alarms.log_scan_interval),
            ("kpi.collection_interval", self.kpi.collection_interval),
            ("events.interval", self.events.interval),
            ("engine.error_backoff", self.engine.error_backoff),
            ("snapshot.interval", self.snapshot.interval),
        ];
        for (name, interval) in intervals {
            if interval.is_zero() {
                return Err(Error::config(format!("{name} must be greater than zero")));
            }
        }

        if self.kpi.window_capacity == 0 {
            return Err(Error::config("kpi.window_capacity must be greater than zero"));
        }

        if !(0.0..=1.0).contains(&self.events.scenario_probability) {
            return Err(Error::config(format!(
                "events.scenario_probability must be within [0, 1], got {}",
                self.events.scenario_probability
            )));
        }

        Ok(())
    }
}

/// Alarm detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Health check period
    #[serde(with = "humantime_serde")]
    pub health_check_interval: Duration,
    /// Fault injection period
    #[serde(with = "humantime_serde")]
    pub fault_interval: Duration,
    /// Log scan period
    #[serde(with = "humantime_serde")]
    pub log_scan_interval: Duration,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            health_check_interval: Duration::from_secs(60),
            fault_interval: Duration::from_secs(300),
            log_scan_interval: Duration::from_secs(30),
        }
    }
}

/// KPI collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiConfig {
    /// Collection period
    #[serde(with = "humantime_serde")]
    pub collection_interval: Duration,
    /// Samples kept per (kpi, node) window
    pub window_capacity: usize,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            collection_interval: Duration::from_secs(60),
            window_capacity: DEFAULT_WINDOW_CAPACITY,
        }
    }
}

/// Event simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Simulation period
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Chance that a cycle runs a scenario instead of random events
    pub scenario_probability: f64,
    /// Sleep between generated events
    pub pacing: bool,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(120),
            scenario_probability: 0.7,
            pacing: true,
        }
    }
}

/// Engine supervision configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pause after a failed tick before the loop continues
    #[serde(with = "humantime_serde")]
    pub error_backoff: Duration,
    /// Seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            error_backoff: Duration::from_secs(5),
            seed: None,
        }
    }
}

/// Snapshot writer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Enable the snapshot writer
    pub enabled: bool,
    /// Directory the JSON snapshots are written to
    pub directory: PathBuf,
    /// Write period
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: PathBuf::from("data"),
            interval: Duration::from_secs(10),
        }
    }
}

/// Prometheus exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Serve self-metrics over HTTP
    pub enabled: bool,
    /// Listen address for the exporter
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 9000)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json or pretty)
    pub format: String,
    /// Directory for daily-rolling log files
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.nodes.len(), 6);
        assert_eq!(config.alarms.fault_interval, Duration::from_secs(300));
        assert_eq!(config.kpi.window_capacity, 1000);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.events.interval, Duration::from_secs(120));
        assert!(config.events.pacing);
        assert!(!config.snapshot.enabled);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[alarms]
health_check_interval = "5s"

[events]
pacing = false
scenario_probability = 1.0

[engine]
seed = 42

[[nodes]]
id = "amf-101"
type = "AMF"
ip = "192.168.0.10"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.alarms.health_check_interval, Duration::from_secs(5));
        assert_eq!(config.alarms.log_scan_interval, Duration::from_secs(30));
        assert!(!config.events.pacing);
        assert_eq!(config.engine.seed, Some(42));
        assert_eq!(config.nodes.len(), 1);
        assert_eq!(config.nodes[0].id, "amf-101");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.kpi.collection_interval = Duration::ZERO;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.events.scenario_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.nodes.push(config.nodes[0].clone());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.nodes.clear();
        assert!(config.validate().is_err());
    }
}
