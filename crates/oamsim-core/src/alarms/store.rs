//! In-memory alarm store

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

use crate::models::{now_timestamp, Alarm, AlarmSeverity, AlarmStatus, AlarmType};

/// Alarm counts for status reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlarmStats {
    pub total: usize,
    pub active: usize,
    pub cleared: usize,
}

struct AlarmBook {
    next_id: u64,
    alarms: BTreeMap<u64, Alarm>,
}

/// Append/update store of alarms keyed by a sequential id
///
/// Id allocation and insertion happen under the same lock, so ids are strictly
/// increasing in insertion order and never handed out twice.
pub struct AlarmStore {
    book: Mutex<AlarmBook>,
}

impl Default for AlarmStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmStore {
    /// Create an empty store; the first alarm gets id 1
    pub fn new() -> Self {
        Self {
            book: Mutex::new(AlarmBook {
                next_id: 1,
                alarms: BTreeMap::new(),
            }),
        }
    }

    /// Raise a new active alarm and return its id
    ///
    /// No deduplication: raising the same condition twice yields two alarms.
    pub fn create_alarm(
        &self,
        node_id: &str,
        alarm_type: AlarmType,
        severity: AlarmSeverity,
        description: impl Into<String>,
    ) -> u64 {
        let description = description.into();

        let id = {
            let mut book = self.book.lock();
            let id = book.next_id;
            book.next_id += 1;
            book.alarms.insert(
                id,
                Alarm {
                    id,
                    node_id: node_id.to_string(),
                    alarm_type,
                    severity,
                    description: description.clone(),
                    raised_time: now_timestamp(),
                    cleared_time: None,
                    status: AlarmStatus::Active,
                },
            );
            id
        };

        warn!(
            alarm_id = id,
            node_id,
            alarm_type = %alarm_type,
            severity = %severity,
            "ALARM RAISED: {}",
            description
        );
        metrics::counter!("oamsim_alarms_raised_total", "severity" => severity.as_str())
            .increment(1);

        id
    }

    /// Clear an active alarm
    ///
    /// Returns `false` when the alarm does not exist or is already cleared.
    pub fn clear_alarm(&self, alarm_id: u64) -> bool {
        let mut book = self.book.lock();
        match book.alarms.get_mut(&alarm_id) {
            Some(alarm) if alarm.is_active() => {
                mark_cleared(alarm);
                true
            }
            _ => false,
        }
    }

    /// Clear every active alarm on `node_id` whose description is exactly `description`
    ///
    /// Returns the ids that were cleared.
    pub fn clear_matching(&self, node_id: &str, description: &str) -> Vec<u64> {
        let mut book = self.book.lock();
        book.alarms
            .values_mut()
            .filter(|a| a.is_active() && a.node_id == node_id && a.description == description)
            .map(|alarm| {
                mark_cleared(alarm);
                alarm.id
            })
            .collect()
    }

    /// Snapshot of the alarms, optionally filtered by status, in id order
    pub fn get_alarms(&self, status: Option<AlarmStatus>) -> Vec<Alarm> {
        self.book
            .lock()
            .alarms
            .values()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect()
    }

    /// Snapshot of one alarm
    pub fn get(&self, alarm_id: u64) -> Option<Alarm> {
        self.book.lock().alarms.get(&alarm_id).cloned()
    }

    /// Alarm counts
    pub fn stats(&self) -> AlarmStats {
        let book = self.book.lock();
        let active = book.alarms.values().filter(|a| a.is_active()).count();
        AlarmStats {
            total: book.alarms.len(),
            active,
            cleared: book.alarms.len() - active,
        }
    }
}

fn mark_cleared(alarm: &mut Alarm) {
    alarm.status = AlarmStatus::Cleared;
    alarm.cleared_time = Some(now_timestamp());

    info!(
        alarm_id = alarm.id,
        node_id = %alarm.node_id,
        severity = %alarm.severity,
        "ALARM CLEARED: {}",
        alarm.description
    );
    metrics::counter!("oamsim_alarms_cleared_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_ids_strictly_increase_and_are_never_reused() {
        let store = AlarmStore::new();
        let first = store.create_alarm("amf-001", AlarmType::Equipment, AlarmSeverity::Critical, "a");
        let second = store.create_alarm("amf-001", AlarmType::Equipment, AlarmSeverity::Minor, "b");
        assert!(store.clear_alarm(second));
        let third = store.create_alarm("smf-001", AlarmType::Security, AlarmSeverity::Warning, "c");

        assert_eq!((first, second, third), (1, 2, 3));
        assert_eq!(store.get(second).unwrap().status, AlarmStatus::Cleared);
    }

    #[test]
    fn test_clear_is_one_shot() {
        let store = AlarmStore::new();
        let id = store.create_alarm("upf-001", AlarmType::Communications, AlarmSeverity::Minor, "x");

        assert!(store.clear_alarm(id));
        let cleared_time = store.get(id).unwrap().cleared_time;
        assert!(cleared_time.is_some());

        assert!(!store.clear_alarm(id));
        assert!(!store.clear_alarm(999));
        assert_eq!(store.get(id).unwrap().cleared_time, cleared_time);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let store = AlarmStore::new();
        store.create_alarm("gnb-001", AlarmType::Equipment, AlarmSeverity::Critical, "Node gnb-001 is down");
        store.create_alarm("gnb-001", AlarmType::Equipment, AlarmSeverity::Critical, "Node gnb-001 is down");

        assert_eq!(store.get_alarms(Some(AlarmStatus::Active)).len(), 2);
    }

    #[test]
    fn test_clear_matching_requires_exact_description() {
        let store = AlarmStore::new();
        let down = store.create_alarm("gnb-001", AlarmType::Equipment, AlarmSeverity::Critical, "Node gnb-001 is down");
        let cpu = store.create_alarm("gnb-001", AlarmType::ProcessingError, AlarmSeverity::Major, "High CPU usage: 91.2%");
        let other = store.create_alarm("gnb-002", AlarmType::Equipment, AlarmSeverity::Critical, "Node gnb-001 is down");

        let cleared = store.clear_matching("gnb-001", "Node gnb-001 is down");

        assert_eq!(cleared, vec![down]);
        assert!(store.get(cpu).unwrap().is_active());
        assert!(store.get(other).unwrap().is_active());
        assert_eq!(
            store.stats(),
            AlarmStats {
                total: 3,
                active: 2,
                cleared: 1
            }
        );
    }

    #[test]
    fn test_concurrent_creation_allocates_unique_ids() {
        let store = Arc::new(AlarmStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..100)
                        .map(|_| store.create_alarm("amf-001", AlarmType::Security, AlarmSeverity::Warning, "t"))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 800);
        assert_eq!(ids.last(), Some(&800));

        let stored: Vec<u64> = store.get_alarms(None).iter().map(|a| a.id).collect();
        assert!(stored.windows(2).all(|w| w[0] < w[1]));
    }
}
