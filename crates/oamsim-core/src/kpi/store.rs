//! Rolling KPI windows keyed by (kpi, node)

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::Path;

use parking_lot::RwLock;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::models::{admits, KpiDefinition, KpiQuery, KpiSample, KpiSummary};

/// Default number of samples kept per (kpi, node)
pub const DEFAULT_WINDOW_CAPACITY: usize = 1000;

/// Filtered samples, grouped kpi -> node -> samples (oldest first)
pub type KpiData = BTreeMap<String, BTreeMap<String, Vec<KpiSample>>>;

/// Filtered summaries, grouped kpi -> node -> summary
pub type KpiSummaries = BTreeMap<String, BTreeMap<String, KpiSummary>>;

/// Fixed-capacity FIFO of samples
///
/// Once full, every push evicts the oldest sample.
#[derive(Debug, Clone)]
pub struct KpiWindow {
    samples: VecDeque<KpiSample>,
    capacity: usize,
}

impl KpiWindow {
    /// Create an empty window (capacity is at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, returning the evicted one when the window was full
    pub fn push(&mut self, sample: KpiSample) -> Option<KpiSample> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    /// Most recently appended sample
    pub fn latest(&self) -> Option<&KpiSample> {
        self.samples.back()
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &KpiSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Store of KPI windows for every defined KPI
pub struct KpiStore {
    definitions: Vec<KpiDefinition>,
    capacity: usize,
    windows: RwLock<BTreeMap<String, BTreeMap<String, KpiWindow>>>,
}

impl KpiStore {
    /// Create a store for the given definitions
    pub fn new(definitions: Vec<KpiDefinition>, capacity: usize) -> Self {
        let windows = definitions
            .iter()
            .map(|d| (d.id.clone(), BTreeMap::new()))
            .collect();

        Self {
            definitions,
            capacity,
            windows: RwLock::new(windows),
        }
    }

    /// Static KPI definitions
    pub fn definitions(&self) -> &[KpiDefinition] {
        &self.definitions
    }

    /// Look up a definition by id
    pub fn definition(&self, kpi_id: &str) -> Option<&KpiDefinition> {
        self.definitions.iter().find(|d| d.id == kpi_id)
    }

    /// Append a sample to the (kpi, node) window
    pub fn record(&self, kpi_id: &str, node_id: &str, sample: KpiSample) -> Result<()> {
        let mut windows = self.windows.write();
        let by_node = windows
            .get_mut(kpi_id)
            .ok_or_else(|| Error::not_found("kpi", kpi_id))?;

        by_node
            .entry(node_id.to_string())
            .or_insert_with(|| KpiWindow::new(self.capacity))
            .push(sample);

        metrics::counter!("oamsim_kpi_samples_total").increment(1);
        Ok(())
    }

    /// Latest sample of every non-empty window, as (kpi_id, node_id, sample)
    pub fn latest_samples(&self) -> Vec<(String, String, KpiSample)> {
        let windows = self.windows.read();
        windows
            .iter()
            .flat_map(|(kpi_id, by_node)| {
                by_node.iter().filter_map(move |(node_id, window)| {
                    window
                        .latest()
                        .map(|s| (kpi_id.clone(), node_id.clone(), s.clone()))
                })
            })
            .collect()
    }

    /// Length of one window (zero when it does not exist)
    pub fn window_len(&self, kpi_id: &str, node_id: &str) -> usize {
        self.windows
            .read()
            .get(kpi_id)
            .and_then(|by_node| by_node.get(node_id))
            .map_or(0, KpiWindow::len)
    }

    /// Total samples held across all windows
    pub fn data_points(&self) -> usize {
        self.windows
            .read()
            .values()
            .flat_map(BTreeMap::values)
            .map(KpiWindow::len)
            .sum()
    }

    /// Samples matching the query
    ///
    /// Every selected KPI appears as a key even when no node has matching samples;
    /// nodes appear only when at least one sample survives the time filter. An
    /// unknown `kpi_id` yields an empty result.
    pub fn get_kpi_data(&self, query: &KpiQuery) -> KpiData {
        let cutoff = query.time_range.as_ref().map(|r| r.cutoff());
        let windows = self.windows.read();
        let mut result = KpiData::new();

        for (kpi_id, by_node) in windows.iter() {
            if query.kpi_id.as_ref().is_some_and(|wanted| wanted != kpi_id) {
                continue;
            }

            let nodes = result.entry(kpi_id.clone()).or_default();
            for (node_id, window) in by_node {
                if query.node_id.as_ref().is_some_and(|wanted| wanted != node_id) {
                    continue;
                }

                let samples: Vec<KpiSample> = window
                    .iter()
                    .filter(|s| admits(cutoff.as_deref(), &s.timestamp))
                    .cloned()
                    .collect();
                if !samples.is_empty() {
                    nodes.insert(node_id.clone(), samples);
                }
            }
        }

        result
    }

    /// Per-window reductions of the samples matching the query
    pub fn get_kpi_summary(&self, query: &KpiQuery) -> KpiSummaries {
        self.get_kpi_data(query)
            .into_iter()
            .map(|(kpi_id, nodes)| {
                let summaries = nodes
                    .into_iter()
                    .filter_map(|(node_id, samples)| summarize(&samples).map(|s| (node_id, s)))
                    .collect();
                (kpi_id, summaries)
            })
            .collect()
    }

    /// Write the samples matching the query to `path` as pretty-printed JSON
    ///
    /// Failures are logged and reported as `false`; nothing is retried.
    pub fn export_kpi_data(&self, path: &Path, query: &KpiQuery) -> bool {
        match self.try_export(path, query) {
            Ok(()) => {
                info!(path = %path.display(), "Exported KPI data");
                true
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error exporting KPI data");
                false
            }
        }
    }

    fn try_export(&self, path: &Path, query: &KpiQuery) -> Result<()> {
        let data = self.get_kpi_data(query);
        let body = serde_json::to_string_pretty(&data)?;
        fs::write(path, body)?;
        Ok(())
    }
}

/// Reduce a window to min/max/mean/count/latest, or `None` when empty
pub fn summarize(samples: &[KpiSample]) -> Option<KpiSummary> {
    let latest = samples.last()?;
    let (min, max, sum) = samples.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), s| (min.min(s.value), max.max(s.value), sum + s.value),
    );

    Some(KpiSummary {
        min,
        max,
        avg: sum / samples.len() as f64,
        count: samples.len(),
        latest: latest.value,
        latest_timestamp: latest.timestamp.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::default_definitions;
    use crate::models::TimeRange;
    use pretty_assertions::assert_eq;

    fn sample(ts: &str, value: f64) -> KpiSample {
        KpiSample {
            timestamp: ts.to_string(),
            value,
        }
    }

    fn store() -> KpiStore {
        KpiStore::new(default_definitions(), DEFAULT_WINDOW_CAPACITY)
    }

    #[test]
    fn test_full_window_evicts_oldest() {
        let mut window = KpiWindow::new(1000);
        for i in 0..1000 {
            assert!(window.push(sample("t", f64::from(i))).is_none());
        }

        let evicted = window.push(sample("t", 1000.0));

        assert_eq!(evicted.map(|s| s.value), Some(0.0));
        assert_eq!(window.len(), 1000);
        assert_eq!(window.iter().next().map(|s| s.value), Some(1.0));
        assert_eq!(window.latest().map(|s| s.value), Some(1000.0));
    }

    #[test]
    fn test_record_rejects_unknown_kpi() {
        let store = store();
        let err = store.record("jitter", "amf-001", sample("t", 1.0));
        assert!(matches!(err, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_summary_mean_and_latest() {
        let store = store();
        for (ts, v) in [("2024-01-01T00:00:01.000000Z", 10.0), ("2024-01-01T00:00:02.000000Z", 20.0), ("2024-01-01T00:00:03.000000Z", 60.0)] {
            store.record("cpu_utilization", "amf-001", sample(ts, v)).unwrap();
        }

        let summaries = store.get_kpi_summary(&KpiQuery::default());
        let summary = &summaries["cpu_utilization"]["amf-001"];

        assert_eq!(
            summary,
            &KpiSummary {
                min: 10.0,
                max: 60.0,
                avg: 30.0,
                count: 3,
                latest: 60.0,
                latest_timestamp: "2024-01-01T00:00:03.000000Z".to_string(),
            }
        );
        // Every defined KPI is present, empty ones included
        assert_eq!(summaries.len(), 8);
        assert!(summaries["throughput"].is_empty());
    }

    #[test]
    fn test_filters() {
        let store = store();
        store.record("error_rate", "amf-001", sample("2024-01-01T00:00:00.000000Z", 1.0)).unwrap();
        store.record("error_rate", "smf-001", sample("2024-01-01T00:00:00.000000Z", 2.0)).unwrap();
        store.record("throughput", "amf-001", sample("2024-01-01T00:00:00.000000Z", 3.0)).unwrap();

        let by_kpi = store.get_kpi_data(&KpiQuery {
            kpi_id: Some("error_rate".to_string()),
            ..KpiQuery::default()
        });
        assert_eq!(by_kpi.len(), 1);
        assert_eq!(by_kpi["error_rate"].len(), 2);

        let by_node = store.get_kpi_data(&KpiQuery {
            node_id: Some("amf-001".to_string()),
            ..KpiQuery::default()
        });
        assert_eq!(by_node["error_rate"].keys().collect::<Vec<_>>(), vec!["amf-001"]);
        assert_eq!(by_node["throughput"]["amf-001"][0].value, 3.0);

        let unknown = store.get_kpi_data(&KpiQuery {
            kpi_id: Some("jitter".to_string()),
            ..KpiQuery::default()
        });
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_time_range_uses_string_order() {
        let store = store();
        for ts in ["2024-01-09T23:59:59.999999Z", "2024-01-10T00:00:00.000000Z", "2024-01-10T08:00:00.000000Z"] {
            store.record("service_latency", "upf-001", sample(ts, 1.0)).unwrap();
        }

        let data = store.get_kpi_data(&KpiQuery {
            time_range: Some(TimeRange::Since("2024-01-10T00:00:00.000000Z".to_string())),
            ..KpiQuery::default()
        });

        let kept: Vec<_> = data["service_latency"]["upf-001"]
            .iter()
            .map(|s| s.timestamp.as_str())
            .collect();
        assert_eq!(kept, vec!["2024-01-10T00:00:00.000000Z", "2024-01-10T08:00:00.000000Z"]);
    }

    #[test]
    fn test_time_range_drops_nodes_with_no_recent_samples() {
        let store = store();
        store.record("service_latency", "upf-001", sample("2000-01-01T00:00:00.000000Z", 1.0)).unwrap();

        let data = store.get_kpi_data(&KpiQuery {
            time_range: Some(TimeRange::Last(std::time::Duration::from_secs(60))),
            ..KpiQuery::default()
        });
        assert!(data["service_latency"].is_empty());
    }

    #[test]
    fn test_export_writes_pretty_json() {
        let store = store();
        store.record("error_rate", "amf-001", sample("2024-01-01T00:00:00.000000Z", 0.5)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kpi.json");

        assert!(store.export_kpi_data(&path, &KpiQuery::default()));

        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.contains("\n  \"error_rate\": {"));
        let parsed: KpiData = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["error_rate"]["amf-001"][0].value, 0.5);
    }

    #[test]
    fn test_export_failure_returns_false() {
        let store = store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("kpi.json");

        assert!(!store.export_kpi_data(&path, &KpiQuery::default()));
    }
}
