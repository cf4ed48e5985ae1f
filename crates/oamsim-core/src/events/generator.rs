//! Single-event generation with type-specific payloads

use std::sync::Arc;

use tracing::{info, warn};

use super::log::EventLog;
use crate::error::{Error, Result};
use crate::models::{Event, EventDetails, EventDraft, EventType, Impact, Node, NodeStatus};
use crate::random::{choose, RandomSource};
use crate::registry::NodeRegistry;

/// Chance that a RECOVERY event succeeds and brings its node back
pub const RECOVERY_SUCCESS_PROBABILITY: f64 = 0.9;

const FAILURE_REASONS: [&str; 4] = [
    "Hardware failure",
    "Software crash",
    "Power outage",
    "Network connectivity loss",
];
const SERVICES: [&str; 4] = [
    "Authentication",
    "Session Management",
    "Policy Control",
    "User Plane",
];
const SERVICE_FAILURE_REASONS: [&str; 4] = [
    "Timeout",
    "Internal error",
    "Dependency failure",
    "Resource constraint",
];
const INTERFACES: [&str; 6] = ["N1", "N2", "N3", "N4", "N6", "All"];
const BREACH_TYPES: [&str; 4] = [
    "Unauthorized access",
    "Authentication bypass",
    "DDoS attack",
    "Data exfiltration",
];
const RESOURCES: [&str; 5] = ["CPU", "Memory", "Disk", "Network bandwidth", "Connection pool"];
const CHANGE_TYPES: [&str; 4] = [
    "Parameter update",
    "Software upgrade",
    "Policy change",
    "Security hardening",
];
const CHANGE_REASONS: [&str; 4] = [
    "Planned maintenance",
    "Performance optimization",
    "Security patch",
    "Bug fix",
];
const FAILOVER_TYPES: [&str; 3] = ["Automatic", "Manual", "Scheduled"];
const RECOVERY_ACTIONS: [&str; 4] = [
    "Restart",
    "Failback",
    "Reconfiguration",
    "Manual intervention",
];

/// Generates node events into the shared log and applies their status side effects
///
/// NODE_FAILURE takes its node down; a successful RECOVERY brings it back.
pub struct EventGenerator {
    registry: Arc<NodeRegistry>,
    log: Arc<EventLog>,
    rng: Arc<dyn RandomSource>,
}

impl EventGenerator {
    pub fn new(
        registry: Arc<NodeRegistry>,
        log: Arc<EventLog>,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        Self { registry, log, rng }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    pub fn log(&self) -> &Arc<EventLog> {
        &self.log
    }

    pub fn rng(&self) -> &dyn RandomSource {
        self.rng.as_ref()
    }

    /// Generate one event of `event_type` targeting `node`
    ///
    /// Load-test events are not node events and are rejected here.
    pub fn generate(&self, event_type: EventType, node: &Node) -> Result<Event> {
        info!(node_id = %node.id, event_type = %event_type, "Generating event");

        let details = self.details_for(event_type, node)?;
        let event = self.log.append(EventDraft {
            event_type,
            target_node: Some(node.id.clone()),
            target_type: node.node_type,
            target_nodes: Vec::new(),
            details,
        });

        let status_change = match &event.details {
            EventDetails::NodeFailure { .. } => Some(NodeStatus::Down),
            EventDetails::Recovery { success: true, .. } => Some(NodeStatus::Active),
            _ => None,
        };
        if let Some(status) = status_change {
            // The event stays in the log even if the node vanished from the registry
            if let Err(e) = self.registry.set_status(&node.id, status) {
                warn!(node_id = %node.id, error = %e, "Failed to apply event side effect");
            }
        }

        warn!(
            event_id = event.id,
            node_id = %node.id,
            "EVENT: {} on {} - {}",
            event_type,
            node.id,
            serde_json::to_string(&event.details)?
        );

        Ok(event)
    }

    fn pick(&self, items: &[&str]) -> String {
        choose(self.rng.as_ref(), items)
            .copied()
            .unwrap_or_default()
            .to_string()
    }

    fn impact(&self) -> Impact {
        choose(self.rng.as_ref(), &Impact::ALL)
            .copied()
            .unwrap_or(Impact::Major)
    }

    fn details_for(&self, event_type: EventType, node: &Node) -> Result<EventDetails> {
        let rng = self.rng.as_ref();

        let details = match event_type {
            EventType::NodeFailure => EventDetails::NodeFailure {
                failure_reason: self.pick(&FAILURE_REASONS),
                severity: self.impact(),
            },
            EventType::ServiceFailure => EventDetails::ServiceFailure {
                service_name: self.pick(&SERVICES),
                failure_reason: self.pick(&SERVICE_FAILURE_REASONS),
                affected_users: rng.int_between(10, 1000),
            },
            EventType::NetworkCongestion => EventDetails::NetworkCongestion {
                congestion_level: rng.uniform(70.0, 100.0),
                affected_interfaces: self.pick(&INTERFACES),
                duration_seconds: rng.int_between(30, 300),
            },
            EventType::SecurityBreach => EventDetails::SecurityBreach {
                breach_type: self.pick(&BREACH_TYPES),
                severity: self.impact(),
                affected_systems: rng.int_between(1, 5),
            },
            EventType::ResourceExhaustion => EventDetails::ResourceExhaustion {
                resource_type: self.pick(&RESOURCES),
                utilization: rng.uniform(90.0, 100.0),
                available_capacity: rng.uniform(0.0, 10.0),
            },
            EventType::ConfigurationChange => EventDetails::ConfigurationChange {
                change_type: self.pick(&CHANGE_TYPES),
                change_reason: self.pick(&CHANGE_REASONS),
                change_id: format!("CHG-{}", rng.int_between(1000, 9999)),
            },
            EventType::Failover => EventDetails::Failover {
                failover_target: format!("{}-BACKUP", node.node_type),
                failover_type: self.pick(&FAILOVER_TYPES),
                failover_duration_seconds: rng.int_between(5, 60),
            },
            EventType::Recovery => EventDetails::Recovery {
                recovery_action: self.pick(&RECOVERY_ACTIONS),
                recovery_duration_seconds: rng.int_between(10, 300),
                success: rng.chance(RECOVERY_SUCCESS_PROBABILITY),
            },
            EventType::LoadTest | EventType::LoadTestCompleted => {
                return Err(Error::validation(format!(
                    "{event_type} is generated by the load-test runner, not for a single node"
                )))
            }
        };

        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_topology, NodeType};
    use crate::random::{FixedRandom, SeededRandom};

    fn generator(rng: Arc<dyn RandomSource>) -> EventGenerator {
        let registry = Arc::new(NodeRegistry::new(default_topology()).unwrap());
        EventGenerator::new(registry, Arc::new(EventLog::new()), rng)
    }

    #[test]
    fn test_node_failure_then_recovery_flips_status() {
        let generator = generator(Arc::new(FixedRandom(0.0)));
        let amf = generator.registry().get("amf-001").unwrap();

        let failure = generator.generate(EventType::NodeFailure, &amf).unwrap();
        assert_eq!(
            generator.registry().get_status("amf-001"),
            Some(NodeStatus::Down)
        );
        assert_eq!(failure.target_node.as_deref(), Some("amf-001"));
        assert_eq!(failure.target_type, NodeType::Amf);

        let recovery = generator.generate(EventType::Recovery, &amf).unwrap();
        assert!(matches!(
            recovery.details,
            EventDetails::Recovery { success: true, .. }
        ));
        assert_eq!(
            generator.registry().get_status("amf-001"),
            Some(NodeStatus::Active)
        );
        assert_eq!(recovery.id, failure.id + 1);
    }

    #[test]
    fn test_failed_recovery_leaves_node_down() {
        let generator = generator(Arc::new(FixedRandom(0.95)));
        let upf = generator.registry().get("upf-001").unwrap();

        generator.generate(EventType::NodeFailure, &upf).unwrap();
        let recovery = generator.generate(EventType::Recovery, &upf).unwrap();

        assert!(matches!(
            recovery.details,
            EventDetails::Recovery { success: false, .. }
        ));
        assert_eq!(
            generator.registry().get_status("upf-001"),
            Some(NodeStatus::Down)
        );
    }

    #[test]
    fn test_payloads_follow_catalogs() {
        let generator = generator(Arc::new(FixedRandom(0.0)));
        let smf = generator.registry().get("smf-001").unwrap();

        let failover = generator.generate(EventType::Failover, &smf).unwrap();
        assert_eq!(
            failover.details,
            EventDetails::Failover {
                failover_target: "SMF-BACKUP".to_string(),
                failover_type: "Automatic".to_string(),
                failover_duration_seconds: 5,
            }
        );

        let change = generator
            .generate(EventType::ConfigurationChange, &smf)
            .unwrap();
        assert!(matches!(
            change.details,
            EventDetails::ConfigurationChange { ref change_id, .. } if change_id == "CHG-1000"
        ));
    }

    #[test]
    fn test_every_node_event_type_generates() {
        let generator = generator(Arc::new(SeededRandom::from_seed(11)));
        let gnb = generator.registry().get("gnb-001").unwrap();

        for event_type in EventType::NODE_EVENTS {
            let event = generator.generate(event_type, &gnb).unwrap();
            assert_eq!(event.event_type, event_type);
        }
        assert_eq!(generator.log().len(), EventType::NODE_EVENTS.len());
    }

    #[test]
    fn test_load_test_types_are_rejected() {
        let generator = generator(Arc::new(FixedRandom(0.0)));
        let gnb = generator.registry().get("gnb-001").unwrap();

        assert!(generator.generate(EventType::LoadTest, &gnb).is_err());
        assert!(generator.log().is_empty());
    }
}
