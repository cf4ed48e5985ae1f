//! Alarm detection policies
//!
//! Three independent detectors feed the [`AlarmStore`]: a synthetic health check,
//! probabilistic fault injection with recovery, and a mock log-pattern scan. Each
//! detector is one tick; scheduling lives in the engine.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::store::AlarmStore;
use crate::error::Result;
use crate::models::{now_timestamp, AlarmSeverity, AlarmType, Node, NodeStatus, NodeType};
use crate::random::{choose, RandomSource};
use crate::registry::NodeRegistry;

/// Chance per tick that a down node comes back
pub const RECOVERY_PROBABILITY: f64 = 0.3;

/// Description of the alarm raised when a node goes down
///
/// Recovery clears alarms whose description equals this string exactly.
pub fn node_down_description(node_id: &str) -> String {
    format!("Node {node_id} is down")
}

/// Injectable fault kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    NodeDown,
    ServiceTimeout,
    MemoryOverflow,
    ConnectionFailure,
    AuthenticationFailure,
}

impl FaultKind {
    /// Every fault kind, in evaluation order
    pub const ALL: [FaultKind; 5] = [
        FaultKind::NodeDown,
        FaultKind::ServiceTimeout,
        FaultKind::MemoryOverflow,
        FaultKind::ConnectionFailure,
        FaultKind::AuthenticationFailure,
    ];

    /// Per node, per tick injection probability
    pub fn probability(self) -> f64 {
        match self {
            FaultKind::NodeDown => 0.05,
            FaultKind::ServiceTimeout => 0.10,
            FaultKind::MemoryOverflow => 0.07,
            FaultKind::ConnectionFailure => 0.15,
            FaultKind::AuthenticationFailure => 0.03,
        }
    }

    fn alarm(self, node_id: &str) -> (AlarmType, AlarmSeverity, String) {
        match self {
            FaultKind::NodeDown => (
                AlarmType::Equipment,
                AlarmSeverity::Critical,
                node_down_description(node_id),
            ),
            FaultKind::ServiceTimeout => (
                AlarmType::QualityOfService,
                AlarmSeverity::Major,
                format!("Service timeout on {node_id}"),
            ),
            FaultKind::MemoryOverflow => (
                AlarmType::ProcessingError,
                AlarmSeverity::Major,
                format!("Memory overflow on {node_id}"),
            ),
            FaultKind::ConnectionFailure => (
                AlarmType::Communications,
                AlarmSeverity::Minor,
                format!("Connection failure on {node_id}"),
            ),
            FaultKind::AuthenticationFailure => (
                AlarmType::Security,
                AlarmSeverity::Warning,
                format!("Authentication failure on {node_id}"),
            ),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            FaultKind::NodeDown => "node_down",
            FaultKind::ServiceTimeout => "service_timeout",
            FaultKind::MemoryOverflow => "memory_overflow",
            FaultKind::ConnectionFailure => "connection_failure",
            FaultKind::AuthenticationFailure => "authentication_failure",
        }
    }
}

/// Messages the mock log generator draws from
pub const LOG_CATALOG: [&str; 9] = [
    "INFO: Normal operation",
    "INFO: Service started",
    "INFO: Connection established",
    "WARNING: High resource usage",
    "WARNING: Authentication failed",
    "ERROR: Connection timed out",
    "ERROR: Service unavailable",
    "CRITICAL: Out of memory",
    "CRITICAL: Temperature exceeds threshold",
];

/// A log pattern and the alarm it maps to
#[derive(Debug, Clone, Copy)]
pub struct LogPattern {
    pub pattern: &'static str,
    pub alarm_type: AlarmType,
    pub severity: AlarmSeverity,
}

/// Patterns matched case-insensitively against every mock log line
pub const LOG_PATTERNS: [LogPattern; 5] = [
    LogPattern {
        pattern: "authentication failed",
        alarm_type: AlarmType::Security,
        severity: AlarmSeverity::Warning,
    },
    LogPattern {
        pattern: "connection timed out",
        alarm_type: AlarmType::Communications,
        severity: AlarmSeverity::Minor,
    },
    LogPattern {
        pattern: "service unavailable",
        alarm_type: AlarmType::QualityOfService,
        severity: AlarmSeverity::Major,
    },
    LogPattern {
        pattern: "out of memory",
        alarm_type: AlarmType::ProcessingError,
        severity: AlarmSeverity::Critical,
    },
    LogPattern {
        pattern: "temperature exceeds threshold",
        alarm_type: AlarmType::Environmental,
        severity: AlarmSeverity::Major,
    },
];

/// A synthesized log line
#[derive(Debug, Clone, Serialize)]
pub struct LogLine {
    pub timestamp: String,
    pub node_id: String,
    pub node_type: NodeType,
    pub message: String,
    pub source: String,
}

/// Patterns that match a log message
pub fn match_patterns(message: &str) -> impl Iterator<Item = &'static LogPattern> {
    let lowered = message.to_lowercase();
    LOG_PATTERNS
        .iter()
        .filter(move |p| lowered.contains(p.pattern))
}

/// Runs the alarm detectors against the shared registry
pub struct AlarmMonitor {
    registry: Arc<NodeRegistry>,
    store: Arc<AlarmStore>,
    rng: Arc<dyn RandomSource>,
}

impl AlarmMonitor {
    /// Create a monitor over the shared registry and store
    pub fn new(
        registry: Arc<NodeRegistry>,
        store: Arc<AlarmStore>,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            registry,
            store,
            rng,
        }
    }

    /// One health-check pass; returns the number of alarms raised
    ///
    /// Thresholds fire independently, so one node can raise up to three alarms.
    pub fn health_check_tick(&self) -> Result<usize> {
        info!("Performing health check on network nodes");
        let mut raised = 0;

        for node in self.registry.list_nodes() {
            let cpu = self.rng.uniform(10.0, 95.0);
            let memory = self.rng.uniform(20.0, 90.0);
            let disk = self.rng.uniform(30.0, 85.0);

            debug!(
                node_id = %node.id,
                "Node health: CPU={:.1}%, Memory={:.1}%, Disk={:.1}%",
                cpu, memory, disk
            );

            if cpu > 90.0 {
                self.store.create_alarm(
                    &node.id,
                    AlarmType::ProcessingError,
                    AlarmSeverity::Major,
                    format!("High CPU usage: {cpu:.1}%"),
                );
                raised += 1;
            }
            if memory > 85.0 {
                self.store.create_alarm(
                    &node.id,
                    AlarmType::ProcessingError,
                    AlarmSeverity::Warning,
                    format!("High memory usage: {memory:.1}%"),
                );
                raised += 1;
            }
            if disk > 80.0 {
                self.store.create_alarm(
                    &node.id,
                    AlarmType::Equipment,
                    AlarmSeverity::Minor,
                    format!("High disk usage: {disk:.1}%"),
                );
                raised += 1;
            }
        }

        Ok(raised)
    }

    /// One fault-injection pass followed by a recovery pass over down nodes
    ///
    /// Returns the number of alarms raised.
    pub fn fault_tick(&self) -> Result<usize> {
        info!("Checking for random fault generation");
        let mut raised = 0;

        for node in self.registry.list_nodes() {
            for fault in FaultKind::ALL {
                if !self.rng.chance(fault.probability()) {
                    continue;
                }

                info!(node_id = %node.id, fault = fault.as_str(), "Generating fault");
                if fault == FaultKind::NodeDown {
                    self.registry.set_status(&node.id, NodeStatus::Down)?;
                }
                let (alarm_type, severity, description) = fault.alarm(&node.id);
                self.store
                    .create_alarm(&node.id, alarm_type, severity, description);
                raised += 1;
            }
        }

        self.recover_down_nodes()?;

        Ok(raised)
    }

    /// Give every down node its recovery trial; returns the recovered node ids
    pub fn recover_down_nodes(&self) -> Result<Vec<String>> {
        let mut recovered = Vec::new();

        for node in self.registry.list_nodes() {
            if node.status != NodeStatus::Down || !self.rng.chance(RECOVERY_PROBABILITY) {
                continue;
            }

            self.registry.set_status(&node.id, NodeStatus::Active)?;
            let cleared = self
                .store
                .clear_matching(&node.id, &node_down_description(&node.id));
            info!(node_id = %node.id, cleared = cleared.len(), "Node recovered");
            recovered.push(node.id);
        }

        Ok(recovered)
    }

    /// One log scan over 5 to 15 synthesized lines; returns the number of alarms raised
    pub fn log_scan_tick(&self) -> Result<usize> {
        let nodes = self.registry.list_nodes();
        let lines = self.rng.int_between(5, 15);
        let mut raised = 0;

        for _ in 0..lines {
            let Some(node) = choose(self.rng.as_ref(), &nodes) else {
                break;
            };
            let line = self.mock_log_line(node);

            for pattern in match_patterns(&line.message) {
                info!(
                    node_id = %node.id,
                    pattern = pattern.pattern,
                    "Found log pattern"
                );
                self.store.create_alarm(
                    &node.id,
                    pattern.alarm_type,
                    pattern.severity,
                    format!("Log pattern match: {}", pattern.pattern),
                );
                raised += 1;
            }
        }

        Ok(raised)
    }

    fn mock_log_line(&self, node: &Node) -> LogLine {
        let message = choose(self.rng.as_ref(), &LOG_CATALOG).copied().unwrap_or_default();
        LogLine {
            timestamp: now_timestamp(),
            node_id: node.id.clone(),
            node_type: node.node_type,
            message: message.to_string(),
            source: format!("{}-service", node.node_type),
        }
    }
}
