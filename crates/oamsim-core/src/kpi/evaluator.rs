//! Threshold evaluation over the latest KPI samples
//!
//! Stateless: each cycle classifies only the newest sample of every window and
//! rebuilds the issue list from scratch. There is no hysteresis and no identity
//! carried between cycles.

use tracing::{info, warn};

use super::store::KpiStore;
use crate::models::{KpiDefinition, KpiIssue, KpiSeverity};

/// Classify a value against a definition's thresholds
///
/// Availability and quality KPIs degrade downward (`value < threshold`),
/// performance and resource KPIs degrade upward (`value > threshold`).
pub fn classify(definition: &KpiDefinition, value: f64) -> KpiSeverity {
    let breaches = |threshold: f64| {
        if definition.category.lower_is_worse() {
            value < threshold
        } else {
            value > threshold
        }
    };

    if breaches(definition.critical_threshold) {
        KpiSeverity::Critical
    } else if breaches(definition.warning_threshold) {
        KpiSeverity::Warning
    } else {
        KpiSeverity::Ok
    }
}

/// Evaluates every window's latest sample against its KPI thresholds
pub struct ThresholdEvaluator;

impl ThresholdEvaluator {
    /// Non-OK classifications for the latest sample of every window
    pub fn evaluate(store: &KpiStore) -> Vec<KpiIssue> {
        info!("Analyzing KPI data");

        let issues: Vec<KpiIssue> = store
            .latest_samples()
            .into_iter()
            .filter_map(|(kpi_id, node_id, sample)| {
                let definition = store.definition(&kpi_id)?;
                let severity = classify(definition, sample.value);
                (severity != KpiSeverity::Ok).then(|| KpiIssue {
                    node_id,
                    kpi_id,
                    kpi_name: definition.name.clone(),
                    value: sample.value,
                    unit: definition.unit.clone(),
                    severity,
                    timestamp: sample.timestamp,
                })
            })
            .collect();

        if issues.is_empty() {
            info!("No KPI issues found");
        } else {
            warn!(count = issues.len(), "Found KPI issues");
            for issue in &issues {
                warn!(
                    node_id = %issue.node_id,
                    kpi_id = %issue.kpi_id,
                    severity = %issue.severity,
                    "KPI Issue: {} on {}: {}{}",
                    issue.kpi_name,
                    issue.node_id,
                    issue.value,
                    issue.unit
                );
            }
        }

        issues
    }
}
