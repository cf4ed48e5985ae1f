//! KPI collection cycle

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::evaluator::ThresholdEvaluator;
use super::store::KpiStore;
use crate::error::Result;
use crate::models::{now_timestamp, KpiDefinition, KpiIssue, KpiSample, Node, Sampling};
use crate::random::RandomSource;
use crate::registry::NodeRegistry;

/// Samples every KPI for every node and evaluates thresholds once per cycle
pub struct KpiCollector {
    registry: Arc<NodeRegistry>,
    store: Arc<KpiStore>,
    rng: Arc<dyn RandomSource>,
    issues: RwLock<Vec<KpiIssue>>,
    cycles: AtomicU64,
}

impl KpiCollector {
    pub fn new(
        registry: Arc<NodeRegistry>,
        store: Arc<KpiStore>,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            registry,
            store,
            rng,
            issues: RwLock::new(Vec::new()),
            cycles: AtomicU64::new(0),
        }
    }

    /// One collection cycle followed by threshold evaluation
    ///
    /// Returns the issues found, which also replace the previous cycle's issues.
    pub fn collect_tick(&self) -> Result<Vec<KpiIssue>> {
        info!("Collecting KPI data");

        for node in self.registry.list_nodes() {
            self.collect_node(&node)?;
        }

        let issues = ThresholdEvaluator::evaluate(&self.store);
        *self.issues.write() = issues.clone();
        self.cycles.fetch_add(1, Ordering::Relaxed);

        Ok(issues)
    }

    /// Append one sample per KPI for a node, all sharing one timestamp
    pub fn collect_node(&self, node: &Node) -> Result<()> {
        let timestamp = now_timestamp();

        for definition in self.store.definitions() {
            if let Some(value) = self.sample_value(definition, node) {
                self.store.record(
                    &definition.id,
                    &node.id,
                    KpiSample {
                        timestamp: timestamp.clone(),
                        value,
                    },
                )?;
            }
        }

        debug!(node_id = %node.id, "Collected KPI data");
        Ok(())
    }

    fn sample_value(&self, definition: &KpiDefinition, node: &Node) -> Option<f64> {
        match definition.sampling {
            Sampling::NodeAvailability => Some(if node.status.is_active() { 100.0 } else { 0.0 }),
            Sampling::Uniform { min, max } => Some(self.rng.uniform(min, max)),
            Sampling::WhenActive {
                min,
                max,
                probability,
            } => (node.status.is_active() && self.rng.chance(probability))
                .then(|| self.rng.uniform(min, max)),
        }
    }

    /// Issues found by the most recent cycle
    pub fn last_issues(&self) -> Vec<KpiIssue> {
        self.issues.read().clone()
    }

    /// Completed collection cycles
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::{default_definitions, DEFAULT_WINDOW_CAPACITY};
    use crate::models::{default_topology, KpiQuery, KpiSeverity, NodeStatus};
    use crate::random::{FixedRandom, SeededRandom};

    fn collector(rng: Arc<dyn RandomSource>) -> (KpiCollector, Arc<NodeRegistry>, Arc<KpiStore>) {
        let registry = Arc::new(NodeRegistry::new(default_topology()).unwrap());
        let store = Arc::new(KpiStore::new(default_definitions(), DEFAULT_WINDOW_CAPACITY));
        (
            KpiCollector::new(registry.clone(), store.clone(), rng),
            registry,
            store,
        )
    }

    #[test]
    fn test_availability_follows_shared_registry() {
        let (collector, registry, store) = collector(Arc::new(SeededRandom::from_seed(3)));
        registry.set_status("upf-001", NodeStatus::Down).unwrap();

        let issues = collector.collect_tick().unwrap();

        let data = store.get_kpi_data(&KpiQuery {
            kpi_id: Some("node_availability".to_string()),
            ..KpiQuery::default()
        });
        assert_eq!(data["node_availability"]["upf-001"][0].value, 0.0);
        assert_eq!(data["node_availability"]["amf-001"][0].value, 100.0);

        let outage = issues
            .iter()
            .find(|i| i.kpi_id == "node_availability")
            .unwrap();
        assert_eq!(outage.node_id, "upf-001");
        assert_eq!(outage.severity, KpiSeverity::Critical);
    }

    #[test]
    fn test_recovery_time_only_for_active_nodes() {
        let (collector, registry, store) = collector(Arc::new(FixedRandom(0.0)));
        registry.set_status("smf-001", NodeStatus::Down).unwrap();

        collector.collect_tick().unwrap();

        assert_eq!(store.window_len("recovery_time", "amf-001"), 1);
        assert_eq!(store.window_len("recovery_time", "smf-001"), 0);
        // 6 nodes x 7 always-sampled KPIs + 5 active recovery samples
        assert_eq!(store.data_points(), 47);
    }

    #[test]
    fn test_recovery_time_skipped_when_trial_fails() {
        let (collector, _, store) = collector(Arc::new(FixedRandom(0.5)));
        collector.collect_tick().unwrap();
        assert_eq!(store.window_len("recovery_time", "amf-001"), 0);
    }

    struct Dial(parking_lot::Mutex<f64>);

    impl RandomSource for Dial {
        fn unit(&self) -> f64 {
            *self.0.lock()
        }
    }

    #[test]
    fn test_issues_are_rebuilt_every_cycle() {
        let dial = Arc::new(Dial(parking_lot::Mutex::new(0.999_999)));
        let (collector, _, _) = collector(dial.clone());

        // Top of every range: CPU lands near 95, which is critical
        let first = collector.collect_tick().unwrap();
        assert!(first.iter().any(|i| i.kpi_id == "cpu_utilization"));

        *dial.0.lock() = 0.0;
        collector.collect_tick().unwrap();

        assert!(collector
            .last_issues()
            .iter()
            .all(|i| i.kpi_id != "cpu_utilization"));
        assert_eq!(collector.cycles(), 2);
    }
}
