//! Built-in failure/recovery scenarios

use crate::models::{EventSpec, EventType, NodeType, Scenario, ScenarioTarget};
use crate::random::{choose, RandomSource};

/// Static set of scenarios the orchestrator picks from
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    /// Catalog over an explicit list of scenarios
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Look up a scenario by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&Scenario> {
        self.scenarios
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Pick one scenario uniformly
    pub fn choose(&self, rng: &dyn RandomSource) -> Option<&Scenario> {
        choose(rng, &self.scenarios)
    }
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        use EventType::*;
        use ScenarioTarget::{All, Type};

        let scenario = |name: &str, description: &str, events: Vec<EventSpec>| Scenario {
            name: name.to_string(),
            description: description.to_string(),
            events,
        };

        Self::new(vec![
            scenario(
                "AMF Failover",
                "Simulate AMF node failure and failover to backup",
                vec![
                    EventSpec::new(NodeFailure, Type(NodeType::Amf), 1.0),
                    EventSpec::new(Failover, Type(NodeType::Amf), 0.9),
                    EventSpec::new(Recovery, Type(NodeType::Amf), 0.8),
                ],
            ),
            scenario(
                "Network Congestion",
                "Simulate network congestion affecting multiple nodes",
                vec![
                    EventSpec::new(NetworkCongestion, All, 1.0),
                    EventSpec::new(ServiceFailure, Type(NodeType::Upf), 0.7),
                    EventSpec::new(Recovery, All, 0.9),
                ],
            ),
            scenario(
                "Resource Exhaustion",
                "Simulate resource exhaustion on a node",
                vec![
                    EventSpec::new(ResourceExhaustion, Type(NodeType::Smf), 1.0),
                    EventSpec::new(ServiceFailure, Type(NodeType::Smf), 0.8),
                    EventSpec::new(Recovery, Type(NodeType::Smf), 0.9),
                ],
            ),
            scenario(
                "Security Incident",
                "Simulate a security breach and response",
                vec![
                    EventSpec::new(SecurityBreach, Type(NodeType::Pcf), 1.0),
                    EventSpec::new(ConfigurationChange, Type(NodeType::Pcf), 0.9),
                    EventSpec::new(Recovery, Type(NodeType::Pcf), 0.95),
                ],
            ),
            scenario(
                "Multiple Node Failure",
                "Simulate multiple node failures and recovery",
                vec![
                    EventSpec::new(NodeFailure, Type(NodeType::Gnb), 1.0),
                    EventSpec::new(NodeFailure, Type(NodeType::Upf), 0.8),
                    EventSpec::new(Failover, Type(NodeType::Gnb), 0.9),
                    EventSpec::new(Failover, Type(NodeType::Upf), 0.7),
                    EventSpec::new(Recovery, Type(NodeType::Gnb), 0.95),
                    EventSpec::new(Recovery, Type(NodeType::Upf), 0.9),
                ],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedRandom;

    #[test]
    fn test_default_catalog() {
        let catalog = ScenarioCatalog::default();
        assert_eq!(catalog.len(), 5);

        let multi = catalog.get("multiple node failure").unwrap();
        assert_eq!(multi.events.len(), 6);
        assert_eq!(multi.events[1].target_type, ScenarioTarget::Type(NodeType::Upf));
        assert_eq!(multi.events[1].probability, 0.8);

        for scenario in catalog.scenarios() {
            assert_eq!(scenario.events[0].probability, 1.0, "{}", scenario.name);
        }
    }

    #[test]
    fn test_choose_is_uniform_over_catalog() {
        let catalog = ScenarioCatalog::default();
        assert_eq!(catalog.choose(&FixedRandom(0.0)).unwrap().name, "AMF Failover");
        assert_eq!(
            catalog.choose(&FixedRandom(0.99)).unwrap().name,
            "Multiple Node Failure"
        );
        assert!(ScenarioCatalog::new(Vec::new()).choose(&FixedRandom(0.0)).is_none());
    }
}
