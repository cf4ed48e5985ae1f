//! Query filters shared by the alarm, KPI and event read surfaces

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::alarm::AlarmStatus;
use super::event::EventType;

/// Format an instant the way every record timestamp is stored
///
/// Fixed-width UTC with microseconds, so lexicographic order equals time order.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time as a record timestamp
pub fn now_timestamp() -> String {
    iso_timestamp(Utc::now())
}

/// Lower bound on record timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    /// Records from the trailing window ending now
    #[serde(with = "humantime_serde")]
    Last(Duration),
    /// Records whose timestamp is at or after this ISO-8601 string
    Since(String),
}

impl TimeRange {
    /// The cutoff string records are compared against
    pub fn cutoff(&self) -> String {
        match self {
            TimeRange::Last(window) => {
                let start = chrono::Duration::from_std(*window)
                    .ok()
                    .and_then(|window| Utc::now().checked_sub_signed(window))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);
                iso_timestamp(start)
            }
            TimeRange::Since(cutoff) => cutoff.clone(),
        }
    }
}

/// Whether `timestamp` falls inside the range
///
/// Plain string comparison, never parsed back into an instant.
pub fn admits(cutoff: Option<&str>, timestamp: &str) -> bool {
    cutoff.map_or(true, |cutoff| timestamp >= cutoff)
}

/// Filter for alarm listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlarmQuery {
    pub status: Option<AlarmStatus>,
}

/// Filter for KPI data and summaries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiQuery {
    pub kpi_id: Option<String>,
    pub node_id: Option<String>,
    pub time_range: Option<TimeRange>,
}

/// Filter for the event log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventQuery {
    pub event_type: Option<EventType>,
    pub node_id: Option<String>,
    pub time_range: Option<TimeRange>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamps_sort_lexicographically() {
        let early = iso_timestamp(Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap());
        let late = iso_timestamp(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap());
        assert_eq!(early, "2024-01-09T23:59:59.000000Z");
        assert!(early < late);
    }

    #[test]
    fn test_admits_is_inclusive_string_comparison() {
        let cutoff = "2024-01-10T00:00:00.000000Z";
        assert!(admits(Some(cutoff), cutoff));
        assert!(admits(Some(cutoff), "2024-01-10T00:00:00.000001Z"));
        assert!(!admits(Some(cutoff), "2024-01-09T23:59:59.999999Z"));
        assert!(admits(None, "anything"));
    }

    #[test]
    fn test_huge_window_admits_everything() {
        let cutoff = TimeRange::Last(Duration::from_secs(u64::MAX)).cutoff();
        assert!(admits(Some(&cutoff), "0000-01-01T00:00:00.000000Z"));
    }
}
