//! Alarm data models

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Alarm severity level
///
/// Ordered so that `Critical` compares greatest and `Cleared` least.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmSeverity {
    /// Service-affecting, immediate action required
    Critical,
    /// Service-affecting, urgent action required
    Major,
    /// Non-service-affecting fault
    Minor,
    /// Potential fault detected before it affects service
    Warning,
    /// Severity could not be determined
    Indeterminate,
    /// Condition has cleared
    Cleared,
}

impl AlarmSeverity {
    /// Upper-case wire label
    pub fn as_str(self) -> &'static str {
        match self {
            AlarmSeverity::Critical => "CRITICAL",
            AlarmSeverity::Major => "MAJOR",
            AlarmSeverity::Minor => "MINOR",
            AlarmSeverity::Warning => "WARNING",
            AlarmSeverity::Indeterminate => "INDETERMINATE",
            AlarmSeverity::Cleared => "CLEARED",
        }
    }

    fn rank(self) -> u8 {
        match self {
            AlarmSeverity::Critical => 5,
            AlarmSeverity::Major => 4,
            AlarmSeverity::Minor => 3,
            AlarmSeverity::Warning => 2,
            AlarmSeverity::Indeterminate => 1,
            AlarmSeverity::Cleared => 0,
        }
    }
}

impl Ord for AlarmSeverity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for AlarmSeverity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AlarmSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ITU-T X.733 style alarm category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmType {
    /// Link or protocol fault
    Communications,
    /// Degraded service quality
    QualityOfService,
    /// Software or processing fault
    ProcessingError,
    /// Hardware fault
    Equipment,
    /// Site environment fault (temperature, power, ...)
    Environmental,
    /// Security violation
    Security,
}

impl AlarmType {
    /// Upper-case wire label
    pub fn as_str(self) -> &'static str {
        match self {
            AlarmType::Communications => "COMMUNICATIONS",
            AlarmType::QualityOfService => "QUALITY_OF_SERVICE",
            AlarmType::ProcessingError => "PROCESSING_ERROR",
            AlarmType::Equipment => "EQUIPMENT",
            AlarmType::Environmental => "ENVIRONMENTAL",
            AlarmType::Security => "SECURITY",
        }
    }
}

impl fmt::Display for AlarmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of an alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlarmStatus {
    /// Alarm is outstanding
    #[default]
    Active,
    /// Alarm has been cleared
    Cleared,
}

/// A raised alarm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    /// Sequential identifier, never reused
    pub id: u64,

    /// Node the alarm was raised against
    pub node_id: String,

    /// Alarm category
    #[serde(rename = "type")]
    pub alarm_type: AlarmType,

    /// Severity at raise time
    pub severity: AlarmSeverity,

    /// Human-readable description
    pub description: String,

    /// When the alarm was raised (ISO-8601)
    pub raised_time: String,

    /// When the alarm was cleared (ISO-8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleared_time: Option<String>,

    /// Current lifecycle state
    pub status: AlarmStatus,
}

impl Alarm {
    /// Whether the alarm is still outstanding
    pub fn is_active(&self) -> bool {
        self.status == AlarmStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(AlarmSeverity::Critical > AlarmSeverity::Major);
        assert!(AlarmSeverity::Major > AlarmSeverity::Minor);
        assert!(AlarmSeverity::Minor > AlarmSeverity::Warning);
        assert!(AlarmSeverity::Warning > AlarmSeverity::Indeterminate);
        assert!(AlarmSeverity::Indeterminate > AlarmSeverity::Cleared);
    }

    #[test]
    fn test_labels_match_serde() {
        let json = serde_json::to_value(AlarmType::QualityOfService).unwrap();
        assert_eq!(json, AlarmType::QualityOfService.as_str());

        let json = serde_json::to_value(AlarmSeverity::Indeterminate).unwrap();
        assert_eq!(json, AlarmSeverity::Indeterminate.as_str());
    }
}
