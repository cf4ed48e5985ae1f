//! End-to-end tests against the public engine surface

use std::sync::Arc;
use std::time::Duration;

use oamsim::prelude::*;
use pretty_assertions::assert_eq;

fn config() -> Config {
    let mut config = Config::default();
    config.events.pacing = false;
    config
}

fn engine(rng: impl RandomSource + 'static) -> Engine {
    Engine::with_random(config(), Arc::new(rng)).unwrap()
}

#[tokio::test]
async fn test_first_ticks_of_every_task() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config();
    config.snapshot.enabled = true;
    config.snapshot.directory = dir.path().to_path_buf();

    // 0.99 trips every health threshold, injects no faults, scans 15 log lines
    // that all match the temperature pattern, and takes the random-event branch
    let engine = Engine::with_random(config, Arc::new(FixedRandom(0.99))).unwrap();
    engine.start();
    tokio::time::sleep(Duration::from_millis(300)).await;
    engine.stop().await;

    let status = engine.status();
    assert!(!status.running);
    assert_eq!(status.alarms.total_alarms, 6 * 3 + 15);
    assert_eq!(status.alarms.active_alarms, 33);
    assert_eq!(status.kpi.data_points, 6 * 7);
    assert_eq!(status.events.events_generated, 3);
    assert_eq!(status.nodes.healthy, 6);

    let temperature = engine.alarms(&AlarmQuery::default());
    assert!(temperature
        .iter()
        .any(|a| a.description == "Log pattern match: temperature exceeds threshold"
            && a.alarm_type == AlarmType::Environmental));

    assert!(dir.path().join("platform_status.json").is_file());
    assert!(dir.path().join("events.json").is_file());
}

#[tokio::test]
async fn test_scenario_order_is_preserved() {
    let engine = engine(FixedRandom(0.0));

    engine.run_scenario("Multiple Node Failure").await.unwrap();

    let emitted: Vec<(EventType, Option<String>)> = engine
        .events(&EventQuery::default())
        .into_iter()
        .map(|e| (e.event_type, e.target_node))
        .collect();
    let gnb = Some("gnb-001".to_string());
    let upf = Some("upf-001".to_string());
    assert_eq!(
        emitted,
        vec![
            (EventType::NodeFailure, gnb.clone()),
            (EventType::NodeFailure, upf.clone()),
            (EventType::Failover, gnb.clone()),
            (EventType::Failover, upf.clone()),
            (EventType::Recovery, gnb),
            (EventType::Recovery, upf),
        ]
    );
}

#[tokio::test]
async fn test_load_test_without_target_nodes() {
    let mut config = config();
    config.nodes.retain(|n| n.node_type != NodeType::Upf);
    let engine = Engine::with_random(config, Arc::new(FixedRandom(0.0))).unwrap();

    assert!(!engine.run_load_test("UPF", 120, "high").await);
    assert_eq!(engine.status().events.events_generated, 0);
}

#[tokio::test]
async fn test_event_outage_is_visible_to_kpi_collection() {
    // 0.85 passes the failure and failover steps but not the 0.8 recovery step
    let engine = engine(FixedRandom(0.85));
    engine.run_scenario("AMF Failover").await.unwrap();
    assert_eq!(
        engine.registry().get_status("amf-001"),
        Some(NodeStatus::Down)
    );

    engine.collect_kpis().unwrap();

    let data = engine.kpi_data(&KpiQuery {
        kpi_id: Some("node_availability".to_string()),
        node_id: Some("amf-001".to_string()),
        ..KpiQuery::default()
    });
    assert_eq!(data["node_availability"]["amf-001"][0].value, 0.0);
    assert!(engine
        .kpi_issues()
        .iter()
        .any(|i| i.node_id == "amf-001"
            && i.kpi_id == "node_availability"
            && i.severity == KpiSeverity::Critical));
    assert_eq!(engine.status().nodes.healthy, 5);
}

#[tokio::test]
async fn test_failover_round_trip() {
    let engine = engine(FixedRandom(0.0));

    let report = engine.simulate_failover_scenario("smf").await.unwrap();

    assert_eq!(report.target_node, "smf-001");
    assert_eq!(report.events.len(), 3);
    assert!(report.metrics.recovery_success);
    assert_eq!(
        report.metrics.total_downtime_seconds,
        report.metrics.detection_time_seconds + report.metrics.failover_time_seconds
    );
    assert_eq!(engine.registry().get_status("smf-001"), Some(NodeStatus::Active));
    assert!(engine.simulate_failover_scenario("MME").await.is_none());
}

#[test]
fn test_kpi_summary_and_export() {
    let engine = Engine::with_random(config(), Arc::new(SeededRandom::from_seed(7))).unwrap();
    for _ in 0..3 {
        engine.collect_kpis().unwrap();
    }

    let query = KpiQuery {
        kpi_id: Some("cpu_utilization".to_string()),
        time_range: Some(TimeRange::Last(Duration::from_secs(3600))),
        ..KpiQuery::default()
    };
    let data = engine.kpi_data(&query);
    let summary = engine.kpi_summary(&query);

    let samples = &data["cpu_utilization"]["upf-001"];
    let stats = &summary["cpu_utilization"]["upf-001"];
    let mean = samples.iter().map(|s| s.value).sum::<f64>() / samples.len() as f64;
    assert_eq!(stats.count, 3);
    assert!((stats.avg - mean).abs() < 1e-9);
    assert_eq!(stats.latest, samples[2].value);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kpi.json");
    assert!(engine.export_kpi_data(&path, &query));
    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(exported["cpu_utilization"]["amf-001"].as_array().unwrap().len(), 3);

    assert!(!engine.export_kpi_data(&dir.path().join("missing").join("kpi.json"), &query));
}
