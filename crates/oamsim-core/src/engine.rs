//! Telemetry and correlation engine
//!
//! Owns the shared registry and stores, schedules the periodic detectors, and
//! exposes the read-only query surface plus the one-shot commands.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::alarms::{AlarmMonitor, AlarmStore};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::{
    EventGenerator, EventLog, EventOrchestrator, LoadTestRunner, Pacer, ScenarioCatalog,
};
use crate::kpi::{default_definitions, KpiCollector, KpiData, KpiStore, KpiSummaries};
use crate::models::{
    now_timestamp, Alarm, AlarmQuery, Event, EventQuery, FailoverReport, KpiIssue, KpiQuery,
    Node,
};
use crate::random::{RandomSource, SeededRandom};
use crate::registry::{NodeRegistry, NodeStats};
use crate::snapshot::SnapshotWriter;

/// Alarm subsystem counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlarmSubsystemStatus {
    pub running: bool,
    pub total_alarms: usize,
    pub active_alarms: usize,
    pub cleared_alarms: usize,
    pub network_nodes: usize,
    pub healthy_nodes: usize,
}

/// KPI subsystem counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiSubsystemStatus {
    pub running: bool,
    pub kpi_count: usize,
    pub node_count: usize,
    pub data_points: usize,
    pub open_issues: usize,
}

/// Event subsystem counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSubsystemStatus {
    pub running: bool,
    pub events_generated: usize,
    pub scenarios_available: usize,
}

/// Aggregated engine status
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub running: bool,
    pub timestamp: String,
    pub nodes: NodeStats,
    pub alarms: AlarmSubsystemStatus,
    pub kpi: KpiSubsystemStatus,
    pub events: EventSubsystemStatus,
}

struct Running {
    cancel: CancellationToken,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

/// The engine handle
///
/// Cheap to clone; every clone shares the same registry, stores and task set.
#[derive(Clone)]
pub struct Engine {
    config: Arc<Config>,
    registry: Arc<NodeRegistry>,
    alarm_store: Arc<AlarmStore>,
    alarm_monitor: Arc<AlarmMonitor>,
    kpi_store: Arc<KpiStore>,
    kpi_collector: Arc<KpiCollector>,
    event_log: Arc<EventLog>,
    orchestrator: Arc<EventOrchestrator>,
    load_tests: Arc<LoadTestRunner>,
    running: Arc<Mutex<Option<Running>>>,
}

impl Engine {
    /// Build an engine, seeding randomness from `engine.seed` when set
    pub fn new(config: Config) -> Result<Self> {
        let rng: Arc<dyn RandomSource> = Arc::new(SeededRandom::new(config.engine.seed));
        Self::with_random(config, rng)
    }

    /// Build an engine around an explicit random source
    pub fn with_random(config: Config, rng: Arc<dyn RandomSource>) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(NodeRegistry::new(config.nodes.clone())?);

        let alarm_store = Arc::new(AlarmStore::new());
        let alarm_monitor = Arc::new(AlarmMonitor::new(
            registry.clone(),
            alarm_store.clone(),
            rng.clone(),
        ));

        let kpi_store = Arc::new(KpiStore::new(
            default_definitions(),
            config.kpi.window_capacity,
        ));
        let kpi_collector = Arc::new(KpiCollector::new(
            registry.clone(),
            kpi_store.clone(),
            rng.clone(),
        ));

        let pacer = Pacer::new(config.events.pacing);
        let event_log = Arc::new(EventLog::new());
        let generator = Arc::new(EventGenerator::new(registry.clone(), event_log.clone(), rng));
        let orchestrator = Arc::new(EventOrchestrator::new(
            generator.clone(),
            ScenarioCatalog::default(),
            config.events.scenario_probability,
            pacer,
        ));
        let load_tests = Arc::new(LoadTestRunner::new(generator, pacer));

        Ok(Self {
            config: Arc::new(config),
            registry,
            alarm_store,
            alarm_monitor,
            kpi_store,
            kpi_collector,
            event_log,
            orchestrator,
            load_tests,
            running: Arc::new(Mutex::new(None)),
        })
    }

    /// Spawn the periodic tasks onto the current tokio runtime
    ///
    /// Starting a running engine only logs a warning.
    pub fn start(&self) {
        let mut running = self.running.lock();
        if running.is_some() {
            warn!("Engine is already running");
            return;
        }

        info!(nodes = self.registry.stats().total, "Starting OAM engine");

        let cancel = CancellationToken::new();
        let backoff = self.config.engine.error_backoff;
        let mut tasks = Vec::new();

        let monitor = self.alarm_monitor.clone();
        tasks.push(spawn_periodic(
            "health_check",
            self.config.alarms.health_check_interval,
            backoff,
            cancel.clone(),
            move || {
                let monitor = monitor.clone();
                async move { monitor.health_check_tick().map(drop) }
            },
        ));

        let monitor = self.alarm_monitor.clone();
        tasks.push(spawn_periodic(
            "fault_generation",
            self.config.alarms.fault_interval,
            backoff,
            cancel.clone(),
            move || {
                let monitor = monitor.clone();
                async move { monitor.fault_tick().map(drop) }
            },
        ));

        let monitor = self.alarm_monitor.clone();
        tasks.push(spawn_periodic(
            "log_scan",
            self.config.alarms.log_scan_interval,
            backoff,
            cancel.clone(),
            move || {
                let monitor = monitor.clone();
                async move { monitor.log_scan_tick().map(drop) }
            },
        ));

        let collector = self.kpi_collector.clone();
        tasks.push(spawn_periodic(
            "kpi_collection",
            self.config.kpi.collection_interval,
            backoff,
            cancel.clone(),
            move || {
                let collector = collector.clone();
                async move { collector.collect_tick().map(drop) }
            },
        ));

        let orchestrator = self.orchestrator.clone();
        tasks.push(spawn_periodic(
            "event_simulation",
            self.config.events.interval,
            backoff,
            cancel.clone(),
            move || {
                let orchestrator = orchestrator.clone();
                async move { orchestrator.tick().await.map(drop) }
            },
        ));

        if self.config.snapshot.enabled {
            let writer = Arc::new(SnapshotWriter::new(
                self.clone(),
                self.config.snapshot.directory.clone(),
            ));
            tasks.push(spawn_periodic(
                "snapshot",
                self.config.snapshot.interval,
                backoff,
                cancel.clone(),
                move || {
                    let writer = writer.clone();
                    async move { writer.write_all() }
                },
            ));
        }

        *running = Some(Running { cancel, tasks });
        info!("OAM engine started");
    }

    /// Signal every task to stop and wait for them to finish their current tick
    pub async fn stop(&self) {
        let Some(Running { cancel, tasks }) = self.running.lock().take() else {
            warn!("Engine is not running");
            return;
        };

        info!("Stopping OAM engine");
        cancel.cancel();

        for (name, handle) in tasks {
            if let Err(e) = handle.await {
                error!(task = name, error = %e, "Task ended abnormally");
            }
        }

        info!("OAM engine stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Aggregated counters across every subsystem
    pub fn status(&self) -> EngineStatus {
        let running = self.is_running();
        let nodes = self.registry.stats();
        let alarms = self.alarm_store.stats();

        EngineStatus {
            running,
            timestamp: now_timestamp(),
            nodes,
            alarms: AlarmSubsystemStatus {
                running,
                total_alarms: alarms.total,
                active_alarms: alarms.active,
                cleared_alarms: alarms.cleared,
                network_nodes: nodes.total,
                healthy_nodes: nodes.healthy,
            },
            kpi: KpiSubsystemStatus {
                running,
                kpi_count: self.kpi_store.definitions().len(),
                node_count: nodes.total,
                data_points: self.kpi_store.data_points(),
                open_issues: self.kpi_collector.last_issues().len(),
            },
            events: EventSubsystemStatus {
                running,
                events_generated: self.event_log.len(),
                scenarios_available: self.orchestrator.scenarios_available(),
            },
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    pub fn nodes(&self) -> Vec<Node> {
        self.registry.list_nodes()
    }

    pub fn alarms(&self, query: &AlarmQuery) -> Vec<Alarm> {
        self.alarm_store.get_alarms(query.status)
    }

    pub fn events(&self, query: &EventQuery) -> Vec<Event> {
        self.event_log.get_events(query)
    }

    pub fn kpi_data(&self, query: &KpiQuery) -> KpiData {
        self.kpi_store.get_kpi_data(query)
    }

    pub fn kpi_summary(&self, query: &KpiQuery) -> KpiSummaries {
        self.kpi_store.get_kpi_summary(query)
    }

    /// Issues found by the latest KPI collection cycle
    pub fn kpi_issues(&self) -> Vec<KpiIssue> {
        self.kpi_collector.last_issues()
    }

    /// Write the filtered KPI data as pretty JSON; false on I/O failure
    pub fn export_kpi_data(&self, path: &Path, query: &KpiQuery) -> bool {
        self.kpi_store.export_kpi_data(path, query)
    }

    /// Run one KPI collection cycle outside the schedule
    pub fn collect_kpis(&self) -> Result<Vec<KpiIssue>> {
        self.kpi_collector.collect_tick()
    }

    /// Run a catalog scenario by name outside the schedule
    pub async fn run_scenario(&self, name: &str) -> Result<Vec<Event>> {
        let scenario = self
            .orchestrator
            .catalog()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found("Scenario", name))?;
        self.orchestrator.run_scenario(&scenario).await
    }

    pub async fn run_load_test(
        &self,
        node_type: &str,
        duration_seconds: u64,
        intensity: &str,
    ) -> bool {
        self.load_tests
            .run_load_test(node_type, duration_seconds, intensity)
            .await
    }

    pub async fn simulate_failover_scenario(&self, node_type: &str) -> Option<FailoverReport> {
        self.load_tests.simulate_failover_scenario(node_type).await
    }
}

/// Run `tick` every `period` until `cancel` fires
///
/// The first tick runs immediately. A failed tick is logged and followed by
/// `backoff` before the schedule resumes. Cancellation is only observed between
/// ticks.
fn spawn_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    backoff: Duration,
    cancel: CancellationToken,
    mut tick: F,
) -> (&'static str, JoinHandle<()>)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        info!(task = name, period = ?period, "Starting periodic task");

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if let Err(e) = tick().await {
                error!(task = name, error = %e, "Periodic task failed");
                metrics::counter!("oamsim_task_failures_total", "task" => name).increment(1);

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(backoff) => {}
                }
            }
        }

        info!(task = name, "Periodic task stopped");
    });

    (name, handle)
}
