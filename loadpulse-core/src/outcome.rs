use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The normalized record of one iteration: timing, size, and
/// success/failure state. Immutable once built; exactly one is
/// produced per executed iteration, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub worker_id: u32,
    /// Thread-style display name for the virtual user (`vu-<k>`).
    pub worker_name: String,
    /// 1-based iteration number. Absent under a duration policy, where
    /// iterations are unbounded and unnumbered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbms_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbms_version: Option<String>,
    pub content_type: String,
    /// Connection establishment time, milliseconds.
    pub connect_time: u64,
    /// Time to first byte, milliseconds. Never exceeds `load_time`.
    pub latency: u64,
    /// Total iteration time, milliseconds.
    pub load_time: u64,
    pub data_sent: u64,
    pub data_received: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Materialized result rows. Empty on failure.
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        self.error_code.is_some()
    }
}
