//! A small target service for exercising the engine in tests: delayed
//! responses, guaranteed failures, JSON row payloads and an echo
//! endpoint.
use axum::{
    debug_handler,
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub async fn run(addr: SocketAddr) {
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app()).await.unwrap();
}

pub fn app() -> Router {
    Router::new()
        .route("/delay/ms/:delay_ms", get(delay))
        .route("/fail", get(fail))
        .route("/rows/:count", get(rows))
        .route("/echo", post(echo))
}

static REQUEST_COUNT: AtomicU64 = AtomicU64::new(0);

pub fn request_count() -> u64 {
    REQUEST_COUNT.load(Ordering::Relaxed)
}

#[debug_handler]
async fn delay(Path(delay_ms): Path<u64>) -> &'static str {
    REQUEST_COUNT.fetch_add(1, Ordering::Relaxed);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    "ok"
}

#[debug_handler]
async fn fail() -> StatusCode {
    REQUEST_COUNT.fetch_add(1, Ordering::Relaxed);
    StatusCode::INTERNAL_SERVER_ERROR
}

#[debug_handler]
async fn rows(Path(count): Path<u64>) -> Json<serde_json::Value> {
    REQUEST_COUNT.fetch_add(1, Ordering::Relaxed);
    let rows: Vec<_> = (0..count)
        .map(|id| serde_json::json!({ "id": id, "name": format!("row-{id}") }))
        .collect();
    Json(serde_json::Value::Array(rows))
}

#[debug_handler]
async fn echo(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
    REQUEST_COUNT.fetch_add(1, Ordering::Relaxed);
    Json(body)
}
