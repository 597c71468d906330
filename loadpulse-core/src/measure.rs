use std::time::Duration;
use thiserror::Error;

/// Raw timing and size data produced by one executor invocation.
///
/// All durations are relative to the iteration start. The outcome
/// builder normalizes these into an [`Outcome`](crate::Outcome).
#[derive(Debug, Clone, Default)]
pub struct RawMeasure {
    pub connect: Duration,
    pub time_to_first_byte: Duration,
    pub total: Duration,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub target_name: Option<String>,
    pub target_version: Option<String>,
    pub content_type: String,
    pub rows: Vec<serde_json::Value>,
}

/// A failed executor invocation, converted into data at the
/// executor/worker boundary rather than unwound as control flow.
#[derive(Debug, Clone, Error)]
#[error("{message} (code {code})")]
pub struct Failure {
    pub code: String,
    pub message: String,
}

impl Failure {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
