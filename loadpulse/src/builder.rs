//! Pure transforms from raw executor measurements into [`Outcome`]s.
use loadpulse_core::{Failure, Outcome, RawMeasure};
use time::OffsetDateTime;

pub(crate) fn success(
    worker_id: u32,
    worker_name: &str,
    iteration: Option<u32>,
    start_at: OffsetDateTime,
    measure: RawMeasure,
) -> Outcome {
    // Both are measured from the same iteration start, but clamp so the
    // latency <= load_time invariant survives millisecond truncation.
    let load_time = measure.total.as_millis() as u64;
    let latency = (measure.time_to_first_byte.as_millis() as u64).min(load_time);

    Outcome {
        worker_id,
        worker_name: worker_name.to_string(),
        iterations: iteration,
        start_at,
        dbms_name: measure.target_name,
        dbms_version: measure.target_version,
        content_type: measure.content_type,
        connect_time: measure.connect.as_millis() as u64,
        latency,
        load_time,
        data_sent: measure.bytes_sent,
        data_received: measure.bytes_received,
        error_code: None,
        error_message: None,
        data: measure.rows,
    }
}

/// Failure still yields a full outcome: identity, timestamp and error
/// fields are stamped, timing fields are best-effort zeros.
pub(crate) fn failure(
    worker_id: u32,
    worker_name: &str,
    iteration: Option<u32>,
    start_at: OffsetDateTime,
    failure: Failure,
) -> Outcome {
    Outcome {
        worker_id,
        worker_name: worker_name.to_string(),
        iterations: iteration,
        start_at,
        dbms_name: None,
        dbms_version: None,
        content_type: "text".to_string(),
        connect_time: 0,
        latency: 0,
        load_time: 0,
        data_sent: 0,
        data_received: 0,
        error_code: Some(failure.code),
        error_message: Some(failure.message),
        data: vec![],
    }
}
