//! Event and scenario data models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use super::node::NodeType;
use crate::error::Error;

/// Kind of simulated event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// A node went down
    NodeFailure,
    /// A service on a node failed
    ServiceFailure,
    /// Traffic congestion on node interfaces
    NetworkCongestion,
    /// Security incident against a node
    SecurityBreach,
    /// A node ran out of some resource
    ResourceExhaustion,
    /// Configuration was changed on a node
    ConfigurationChange,
    /// Traffic was switched to a backup
    Failover,
    /// Recovery action was attempted on a node
    Recovery,
    /// A load test started
    LoadTest,
    /// A load test finished
    LoadTestCompleted,
}

impl EventType {
    /// Event kinds that target a single node and can be generated at random
    pub const NODE_EVENTS: [EventType; 8] = [
        EventType::NodeFailure,
        EventType::ServiceFailure,
        EventType::NetworkCongestion,
        EventType::SecurityBreach,
        EventType::ResourceExhaustion,
        EventType::ConfigurationChange,
        EventType::Failover,
        EventType::Recovery,
    ];

    /// Upper-case wire label
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::NodeFailure => "NODE_FAILURE",
            EventType::ServiceFailure => "SERVICE_FAILURE",
            EventType::NetworkCongestion => "NETWORK_CONGESTION",
            EventType::SecurityBreach => "SECURITY_BREACH",
            EventType::ResourceExhaustion => "RESOURCE_EXHAUSTION",
            EventType::ConfigurationChange => "CONFIGURATION_CHANGE",
            EventType::Failover => "FAILOVER",
            EventType::Recovery => "RECOVERY",
            EventType::LoadTest => "LOAD_TEST",
            EventType::LoadTestCompleted => "LOAD_TEST_COMPLETED",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::NODE_EVENTS
            .into_iter()
            .chain([EventType::LoadTest, EventType::LoadTestCompleted])
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation(format!("unknown event type '{s}'")))
    }
}

/// Qualitative impact attached to failure and breach events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    Critical,
    Major,
    Minor,
}

impl Impact {
    /// All impact levels
    pub const ALL: [Impact; 3] = [Impact::Critical, Impact::Major, Impact::Minor];
}

/// Load profile for a load test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intensity::Low => f.write_str("low"),
            Intensity::Medium => f.write_str("medium"),
            Intensity::High => f.write_str("high"),
        }
    }
}

impl FromStr for Intensity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Intensity::Low),
            "medium" => Ok(Intensity::Medium),
            "high" => Ok(Intensity::High),
            _ => Err(Error::validation(format!("invalid intensity '{s}'"))),
        }
    }
}

/// Observed degradation reported when a load test completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceImpact {
    pub latency_increase_percent: f64,
    pub throughput_decrease_percent: f64,
    pub error_rate_increase_percent: f64,
}

/// Type-specific event payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventDetails {
    NodeFailure {
        failure_reason: String,
        severity: Impact,
    },
    ServiceFailure {
        service_name: String,
        failure_reason: String,
        affected_users: u64,
    },
    NetworkCongestion {
        congestion_level: f64,
        affected_interfaces: String,
        duration_seconds: u64,
    },
    SecurityBreach {
        breach_type: String,
        severity: Impact,
        affected_systems: u64,
    },
    ResourceExhaustion {
        resource_type: String,
        utilization: f64,
        available_capacity: f64,
    },
    ConfigurationChange {
        change_type: String,
        change_reason: String,
        change_id: String,
    },
    Failover {
        failover_target: String,
        failover_type: String,
        failover_duration_seconds: u64,
    },
    Recovery {
        recovery_action: String,
        recovery_duration_seconds: u64,
        success: bool,
    },
    LoadTest {
        duration_seconds: u64,
        intensity: Intensity,
        cpu_load: f64,
        memory_load: f64,
        connection_load: u64,
    },
    LoadTestCompleted {
        original_test_id: u64,
        success: bool,
        failures: u64,
        performance_impact: PerformanceImpact,
    },
}

/// Where a new event should be attributed before it receives an id
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub event_type: EventType,
    pub target_node: Option<String>,
    pub target_type: NodeType,
    pub target_nodes: Vec<String>,
    pub details: EventDetails,
}

/// An immutable record of something that happened to one or more nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Sequential identifier shared by every generation path
    pub id: u64,

    /// Event kind
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Node the event happened to (absent for load tests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_node: Option<String>,

    /// Role of the targeted node(s)
    pub target_type: NodeType,

    /// Nodes covered by a load test
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_nodes: Vec<String>,

    /// When the event was appended (ISO-8601)
    pub timestamp: String,

    /// Type-specific payload
    pub details: EventDetails,
}

/// Which nodes a scenario step may land on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioTarget {
    /// Any node in the topology
    All,
    /// Only nodes of this role
    Type(NodeType),
}

impl ScenarioTarget {
    /// Whether a node of the given role is eligible
    pub fn admits(self, node_type: NodeType) -> bool {
        match self {
            ScenarioTarget::All => true,
            ScenarioTarget::Type(t) => t == node_type,
        }
    }
}

impl fmt::Display for ScenarioTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioTarget::All => f.write_str("ALL"),
            ScenarioTarget::Type(t) => t.fmt(f),
        }
    }
}

impl Serialize for ScenarioTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One step of a scenario script
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSpec {
    /// Event to generate
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Eligible targets
    pub target_type: ScenarioTarget,

    /// Chance that the step fires
    pub probability: f64,
}

impl EventSpec {
    /// Build a step
    pub fn new(event_type: EventType, target_type: ScenarioTarget, probability: f64) -> Self {
        Self {
            event_type,
            target_type,
            probability,
        }
    }
}

/// An ordered, probabilistic failure/recovery script
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    /// Steps in execution order
    pub events: Vec<EventSpec>,
}

/// Reference to an event inside a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRef {
    pub id: u64,
    #[serde(rename = "type")]
    pub event_type: EventType,
}

impl From<&Event> for EventRef {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            event_type: event.event_type,
        }
    }
}

/// Timing and outcome derived from a failover simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailoverMetrics {
    pub detection_time_seconds: f64,
    pub failover_time_seconds: f64,
    pub recovery_time_seconds: f64,
    pub total_downtime_seconds: f64,
    pub recovery_success: bool,
}

/// Result of a failover simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailoverReport {
    pub scenario: String,
    pub target_node: String,
    pub target_type: NodeType,
    /// Failure, failover and recovery, in that order
    pub events: Vec<EventRef>,
    pub metrics: FailoverMetrics,
}
