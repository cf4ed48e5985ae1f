//! Built-in KPI definitions

use crate::models::{KpiCategory, KpiDefinition, Sampling};

/// Chance that a recovery-time sample is recorded for an active node
pub const RECOVERY_SAMPLE_PROBABILITY: f64 = 0.1;

fn kpi(
    id: &str,
    name: &str,
    description: &str,
    unit: &str,
    (target, warning_threshold, critical_threshold): (f64, f64, f64),
    category: KpiCategory,
    sampling: Sampling,
) -> KpiDefinition {
    KpiDefinition {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        unit: unit.to_string(),
        target,
        warning_threshold,
        critical_threshold,
        category,
        sampling,
    }
}

/// The KPIs collected for every node
pub fn default_definitions() -> Vec<KpiDefinition> {
    vec![
        kpi(
            "node_availability",
            "Node Availability",
            "Percentage of time a node is available",
            "%",
            (99.99, 99.9, 99.5),
            KpiCategory::Availability,
            Sampling::NodeAvailability,
        ),
        kpi(
            "service_latency",
            "Service Latency",
            "Average latency for service requests",
            "ms",
            (50.0, 100.0, 200.0),
            KpiCategory::Performance,
            Sampling::Uniform { min: 10.0, max: 200.0 },
        ),
        kpi(
            "error_rate",
            "Error Rate",
            "Percentage of requests resulting in errors",
            "%",
            (0.1, 1.0, 5.0),
            KpiCategory::Quality,
            Sampling::Uniform { min: 0.0, max: 10.0 },
        ),
        kpi(
            "cpu_utilization",
            "CPU Utilization",
            "Average CPU utilization of nodes",
            "%",
            (60.0, 80.0, 90.0),
            KpiCategory::Resource,
            Sampling::Uniform { min: 20.0, max: 95.0 },
        ),
        kpi(
            "memory_utilization",
            "Memory Utilization",
            "Average memory utilization of nodes",
            "%",
            (70.0, 85.0, 95.0),
            KpiCategory::Resource,
            Sampling::Uniform { min: 30.0, max: 90.0 },
        ),
        kpi(
            "throughput",
            "Network Throughput",
            "Average network throughput",
            "Mbps",
            (1000.0, 500.0, 100.0),
            KpiCategory::Performance,
            Sampling::Uniform {
                min: 100.0,
                max: 2000.0,
            },
        ),
        kpi(
            "connection_success_rate",
            "Connection Success Rate",
            "Percentage of successful connection attempts",
            "%",
            (99.9, 99.0, 95.0),
            KpiCategory::Quality,
            Sampling::Uniform { min: 90.0, max: 100.0 },
        ),
        kpi(
            "recovery_time",
            "Recovery Time",
            "Average time to recover from failures",
            "seconds",
            (30.0, 60.0, 300.0),
            KpiCategory::Availability,
            Sampling::WhenActive {
                min: 10.0,
                max: 500.0,
                probability: RECOVERY_SAMPLE_PROBABILITY,
            },
        ),
    ]
}
