//! Periodic event simulation
//!
//! Each tick either runs one scenario or emits a short burst of unrelated random
//! events. Scenario steps are emitted strictly in their declared order.

use std::sync::Arc;

use tracing::{info, warn};

use super::catalog::ScenarioCatalog;
use super::generator::EventGenerator;
use super::Pacer;
use crate::error::Result;
use crate::models::{Event, EventType, Node, Scenario};
use crate::random::choose;

/// Drives scenario execution and random event generation
pub struct EventOrchestrator {
    generator: Arc<EventGenerator>,
    catalog: ScenarioCatalog,
    scenario_probability: f64,
    pacer: Pacer,
}

impl EventOrchestrator {
    pub fn new(
        generator: Arc<EventGenerator>,
        catalog: ScenarioCatalog,
        scenario_probability: f64,
        pacer: Pacer,
    ) -> Self {
        Self {
            generator,
            catalog,
            scenario_probability,
            pacer,
        }
    }

    pub fn catalog(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    pub fn scenarios_available(&self) -> usize {
        self.catalog.len()
    }

    /// One simulation cycle; returns the events it generated
    pub async fn tick(&self) -> Result<Vec<Event>> {
        info!("Running event simulation cycle");
        let rng = self.generator.rng();

        if rng.chance(self.scenario_probability) {
            if let Some(scenario) = self.catalog.choose(rng) {
                return self.run_scenario(scenario).await;
            }
        }

        self.generate_random_events().await
    }

    /// Execute a scenario's steps in order
    ///
    /// Each step fires on its own Bernoulli trial and lands on one node drawn
    /// uniformly from the eligible set. Steps that fail the trial, or that have no
    /// eligible node, are skipped.
    pub async fn run_scenario(&self, scenario: &Scenario) -> Result<Vec<Event>> {
        info!(scenario = %scenario.name, "Running scenario: {}", scenario.name);
        info!(scenario = %scenario.name, "Description: {}", scenario.description);

        let rng = self.generator.rng();
        let mut events = Vec::new();

        for spec in &scenario.events {
            if !rng.chance(spec.probability) {
                info!(
                    event_type = %spec.event_type,
                    "Event {} skipped due to probability",
                    spec.event_type
                );
                continue;
            }

            let targets: Vec<Node> = self
                .generator
                .registry()
                .list_nodes()
                .into_iter()
                .filter(|n| spec.target_type.admits(n.node_type))
                .collect();

            let Some(target) = choose(rng, &targets) else {
                warn!(
                    target_type = %spec.target_type,
                    "No matching nodes found for type {}",
                    spec.target_type
                );
                continue;
            };

            events.push(self.generator.generate(spec.event_type, target)?);
            self.pacer.pause_secs(rng.uniform(1.0, 5.0)).await;
        }

        Ok(events)
    }

    /// Emit 1 to 3 independent events of uniformly chosen type and node
    pub async fn generate_random_events(&self) -> Result<Vec<Event>> {
        info!("Generating random events");

        let rng = self.generator.rng();
        let count = rng.int_between(1, 3);
        let mut events = Vec::new();

        for _ in 0..count {
            let nodes = self.generator.registry().list_nodes();
            let (Some(event_type), Some(node)) = (
                choose(rng, &EventType::NODE_EVENTS).copied(),
                choose(rng, &nodes),
            ) else {
                break;
            };

            events.push(self.generator.generate(event_type, node)?);
            self.pacer.pause_secs(rng.uniform(1.0, 3.0)).await;
        }

        Ok(events)
    }
}
