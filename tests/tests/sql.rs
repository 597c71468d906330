mod utils;
use utils::*;

use loadpulse::{LoadTest, RunEvent};
use loadpulse_core::{RunConfig, SqlTarget, TargetParams, TerminationPolicy};
use std::time::Duration;

fn sqlite_config(query: &str, virtual_users: u32, iterations: u32) -> RunConfig {
    RunConfig {
        virtual_users,
        termination: TerminationPolicy::Iterations(iterations),
        ramp_up: Duration::ZERO,
        target: TargetParams::Sql(SqlTarget {
            url: "sqlite::memory:".to_string(),
            username: None,
            password: None,
            query: query.to_string(),
        }),
    }
}

#[tokio::test]
async fn sql_run_materializes_rows_and_sizes() {
    init().await;

    let config = sqlite_config("SELECT 1 AS one, 'two' AS two", 2, 2);
    let mut handle = LoadTest::new(config).unwrap().stream();

    let mut outcomes = Vec::new();
    let mut terminal = None;
    while let Some(event) = handle.recv().await {
        match event {
            RunEvent::Outcome(outcome) => outcomes.push(outcome),
            RunEvent::Closed(result) => terminal = Some(result),
        }
    }

    assert_eq!(outcomes.len(), 4);
    assert!(terminal.unwrap().is_ok());
    for outcome in &outcomes {
        assert!(!outcome.is_error(), "unexpected failure: {outcome:?}");
        assert_eq!(outcome.data.len(), 1);
        assert_eq!(outcome.data[0]["two"], "two");
        // SQL outcomes report no request payload, like the original.
        assert_eq!(outcome.data_sent, 0);
        assert!(outcome.data_received > 0);
        assert!(outcome.latency <= outcome.load_time);
        assert!(outcome
            .dbms_name
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
            .contains("sqlite"));
        assert_eq!(outcome.content_type, "text");
    }
}

#[tokio::test]
async fn malformed_query_is_a_failed_outcome_not_a_crash() {
    init().await;

    let config = sqlite_config("SELEC nonsense FROM nowhere", 1, 2);
    let mut handle = LoadTest::new(config).unwrap().stream();

    let mut outcomes = Vec::new();
    let mut terminal = None;
    while let Some(event) = handle.recv().await {
        match event {
            RunEvent::Outcome(outcome) => outcomes.push(outcome),
            RunEvent::Closed(result) => terminal = Some(result),
        }
    }

    // Both iterations ran; the worker survived the first failure.
    assert_eq!(outcomes.len(), 2);
    assert!(terminal.unwrap().is_ok());
    for outcome in &outcomes {
        assert!(outcome.error_code.is_some());
        assert!(outcome.error_message.is_some());
        assert!(outcome.data.is_empty());
    }
}
