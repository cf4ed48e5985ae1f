//! KPI data models

use std::fmt;

use serde::{Deserialize, Serialize};

/// Grouping of a KPI, which also fixes the direction its thresholds apply in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiCategory {
    /// Uptime style indicators
    Availability,
    /// Latency and throughput
    Performance,
    /// Error and success rates
    Quality,
    /// Utilization of compute resources
    Resource,
}

impl KpiCategory {
    /// Whether a value falling below the thresholds is the degraded direction
    pub fn lower_is_worse(self) -> bool {
        matches!(self, KpiCategory::Availability | KpiCategory::Quality)
    }
}

/// How synthetic values for a KPI are produced on every collection tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Sampling {
    /// 100 when the node is active, 0 otherwise
    NodeAvailability,
    /// Uniform draw in `[min, max]`
    Uniform { min: f64, max: f64 },
    /// Uniform draw in `[min, max]`, recorded only for active nodes when a trial succeeds
    WhenActive { min: f64, max: f64, probability: f64 },
}

/// Static definition of a KPI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiDefinition {
    /// Identifier (e.g. "cpu_utilization")
    pub id: String,

    /// Display name
    pub name: String,

    /// What the indicator measures
    pub description: String,

    /// Unit label
    pub unit: String,

    /// Target value
    pub target: f64,

    /// Warning threshold
    pub warning_threshold: f64,

    /// Critical threshold
    pub critical_threshold: f64,

    /// Category
    pub category: KpiCategory,

    /// Value generation rule
    pub sampling: Sampling,
}

/// A single timestamped measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSample {
    /// Collection time (ISO-8601)
    pub timestamp: String,

    /// Measured value
    pub value: f64,
}

/// Result of evaluating a KPI value against its thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KpiSeverity {
    /// Within thresholds
    Ok,
    /// Past the warning threshold
    Warning,
    /// Past the critical threshold
    Critical,
}

impl fmt::Display for KpiSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpiSeverity::Ok => f.write_str("OK"),
            KpiSeverity::Warning => f.write_str("WARNING"),
            KpiSeverity::Critical => f.write_str("CRITICAL"),
        }
    }
}

/// A threshold breach found in the latest collection cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiIssue {
    pub node_id: String,
    pub kpi_id: String,
    pub kpi_name: String,
    pub value: f64,
    pub unit: String,
    pub severity: KpiSeverity,
    pub timestamp: String,
}

/// Reduction of one (kpi, node) window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    /// Smallest value in the window
    pub min: f64,

    /// Largest value in the window
    pub max: f64,

    /// Arithmetic mean of the window
    pub avg: f64,

    /// Number of samples
    pub count: usize,

    /// Most recently appended value
    pub latest: f64,

    /// Timestamp of the most recent sample
    pub latest_timestamp: String,
}
