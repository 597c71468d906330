mod utils;
use utils::*;

use futures::StreamExt;
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

const SERVER_ADDR: &str = "127.0.0.1:3011";

async fn init_server() {
    init().await;

    static ONCE_LOCK: OnceLock<()> = OnceLock::new();
    let wait = ONCE_LOCK.get().is_none();

    ONCE_LOCK.get_or_init(|| {
        // Like the mock in utils.rs, the server must outlive any single
        // test's runtime, so it runs on its own runtime in a dedicated
        // thread.
        std::thread::spawn(|| {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let addr: SocketAddr = SERVER_ADDR.parse().unwrap();
                let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
                axum::serve(listener, loadpulse_server::router())
                    .await
                    .unwrap();
            });
        });
    });

    if wait {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

#[tokio::test]
async fn run_endpoint_streams_outcomes_then_completes() {
    init_server().await;

    let body = serde_json::json!({
        "virtualUsers": 2,
        "terminationPolicy": { "iterations": 2 },
        "rampUpSeconds": 0,
        "target": {
            "protocol": "http",
            "url": format!("http://{}/rows/1", MOCK_ADDR.replace("0.0.0.0", "127.0.0.1")),
            "method": "GET"
        }
    });

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{SERVER_ADDR}/run"))
        .json(&body)
        .send()
        .await
        .expect("request failed");
    assert!(response.status().is_success());

    // Collect the SSE frames until the terminal event arrives.
    let mut raw = String::new();
    let mut stream = response.bytes_stream();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while !raw.contains("event: complete") && !raw.contains("event: error") {
        let chunk = tokio::time::timeout_at(deadline, stream.next())
            .await
            .expect("timed out waiting for terminal event")
            .expect("stream ended without terminal event")
            .expect("stream error");
        raw.push_str(&String::from_utf8_lossy(&chunk));
    }

    assert_eq!(raw.matches("event: outcome").count(), 4);
    assert_eq!(raw.matches("event: complete").count(), 1);
    assert!(!raw.contains("event: error"));
    // Outcome payloads carry the wire fields.
    assert!(raw.contains("\"workerId\""));
    assert!(raw.contains("\"loadTime\""));
}

#[tokio::test]
async fn invalid_run_request_is_rejected_with_400() {
    init_server().await;

    let body = serde_json::json!({
        "virtualUsers": 2,
        "terminationPolicy": { "iterations": 0 },
        "rampUpSeconds": 0,
        "target": { "protocol": "http", "url": "http://127.0.0.1:1/" }
    });

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{SERVER_ADDR}/run"))
        .json(&body)
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let payload: serde_json::Value = response.json().await.unwrap();
    assert!(payload["error"].as_str().unwrap().contains("iteration count"));
}
