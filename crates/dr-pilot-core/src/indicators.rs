//! Replication health indicators
//!
//! Classifies how far behind a placement control's volume replication is
//! relative to the policy's scheduling interval, and provides the display
//! vocabulary the table and overlays share.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sync age below this many intervals is considered healthy
const WARNING_THRESHOLD: u32 = 2;
/// Sync age at or beyond this many intervals is critical
const CRITICAL_THRESHOLD: u32 = 3;

/// Replication health of a policy's placement controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReplicationHealth {
    /// Last sync landed within the expected cadence
    Healthy,
    /// Sync is lagging but within tolerances
    Warning,
    /// Sync is far behind the declared cadence
    Critical,
    /// No sync has been observed, or the cadence is unparsable
    #[default]
    Unknown,
}

impl ReplicationHealth {
    /// Single-character symbol for table cells
    pub fn symbol(&self) -> &'static str {
        match self {
            ReplicationHealth::Healthy => "●",
            ReplicationHealth::Warning => "◐",
            ReplicationHealth::Critical => "✗",
            ReplicationHealth::Unknown => "?",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ReplicationHealth::Healthy => "Healthy",
            ReplicationHealth::Warning => "Warning",
            ReplicationHealth::Critical => "Critical",
            ReplicationHealth::Unknown => "Unknown",
        }
    }

    /// Severity for aggregation; higher is worse
    fn severity(&self) -> u8 {
        match self {
            ReplicationHealth::Healthy => 0,
            ReplicationHealth::Unknown => 1,
            ReplicationHealth::Warning => 2,
            ReplicationHealth::Critical => 3,
        }
    }

    /// Return the more severe of two health states
    pub fn worst(self, other: ReplicationHealth) -> ReplicationHealth {
        if self.severity() >= other.severity() {
            self
        } else {
            other
        }
    }

    pub fn needs_attention(&self) -> bool {
        matches!(self, ReplicationHealth::Warning | ReplicationHealth::Critical)
    }
}

impl std::fmt::Display for ReplicationHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classify replication health from the time since the last group sync
///
/// Below two intervals is healthy, below three is a warning, beyond that is
/// critical. Missing sync time or cadence yields `Unknown`.
pub fn classify_sync_health(
    sync_age: Option<Duration>,
    interval: Option<Duration>,
) -> ReplicationHealth {
    let (Some(age), Some(interval)) = (sync_age, interval) else {
        return ReplicationHealth::Unknown;
    };
    if interval.is_zero() {
        return ReplicationHealth::Unknown;
    }

    if age < interval * WARNING_THRESHOLD {
        ReplicationHealth::Healthy
    } else if age < interval * CRITICAL_THRESHOLD {
        ReplicationHealth::Warning
    } else {
        ReplicationHealth::Critical
    }
}

/// Parse a Ramen scheduling interval ("30s", "5m", "1h", "1d")
pub fn parse_scheduling_interval(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.len() < 2 {
        return None;
    }
    let (number, unit) = value.split_at(value.len() - 1);
    let number: u64 = number.parse().ok()?;
    let seconds = match unit {
        "s" => number,
        "m" => number * 60,
        "h" => number * 3600,
        "d" => number * 86_400,
        _ => return None,
    };
    Some(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scheduling_interval() {
        assert_eq!(parse_scheduling_interval("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_scheduling_interval("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_scheduling_interval("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_scheduling_interval("1d"), Some(Duration::from_secs(86_400)));
        assert_eq!(parse_scheduling_interval("5x"), None);
        assert_eq!(parse_scheduling_interval(""), None);
        assert_eq!(parse_scheduling_interval("m"), None);
    }

    #[test]
    fn test_classify_boundaries() {
        let interval = Some(Duration::from_secs(300));

        assert_eq!(
            classify_sync_health(Some(Duration::from_secs(599)), interval),
            ReplicationHealth::Healthy
        );
        assert_eq!(
            classify_sync_health(Some(Duration::from_secs(600)), interval),
            ReplicationHealth::Warning
        );
        assert_eq!(
            classify_sync_health(Some(Duration::from_secs(900)), interval),
            ReplicationHealth::Critical
        );
    }

    #[test]
    fn test_classify_unknown_inputs() {
        assert_eq!(
            classify_sync_health(None, Some(Duration::from_secs(300))),
            ReplicationHealth::Unknown
        );
        assert_eq!(
            classify_sync_health(Some(Duration::from_secs(10)), None),
            ReplicationHealth::Unknown
        );
        assert_eq!(
            classify_sync_health(Some(Duration::from_secs(10)), Some(Duration::ZERO)),
            ReplicationHealth::Unknown
        );
    }

    #[test]
    fn test_worst_aggregation() {
        assert_eq!(
            ReplicationHealth::Healthy.worst(ReplicationHealth::Critical),
            ReplicationHealth::Critical
        );
        assert_eq!(
            ReplicationHealth::Warning.worst(ReplicationHealth::Unknown),
            ReplicationHealth::Warning
        );
    }
}
