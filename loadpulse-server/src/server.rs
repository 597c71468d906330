use crate::error::ApiError;
use axum::{
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures_util::stream::{Stream, StreamExt};
use loadpulse::{LoadTest, RunEvent};
use loadpulse_core::RunConfig;
use std::convert::Infallible;
use std::net::SocketAddr;
use thiserror::Error;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Address Parsing Error")]
    AddrParseError(#[from] std::net::AddrParseError),

    #[error("IO Error")]
    IoError(#[from] std::io::Error),
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/run", post(run))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

pub async fn serve(port: u16) -> Result<(), ServerError> {
    let socket_addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(socket_addr).await?;

    debug!("Axum server starting up...");
    axum::serve(listener, router()).await?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

/// Accepts a run request and answers with a long-lived SSE stream: one
/// `outcome` event per iteration, then exactly one terminal `complete`
/// or `error` event. Invalid configurations are rejected with 400
/// before any worker launches.
#[instrument(skip_all, fields(virtual_users = config.virtual_users))]
async fn run(
    Json(config): Json<RunConfig>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let handle = LoadTest::new(config)?.stream();
    let (events, _cancel) = handle.split();

    let stream = UnboundedReceiverStream::new(events).map(|event| {
        Ok(match event {
            RunEvent::Outcome(outcome) => Event::default()
                .event("outcome")
                .json_data(&outcome)
                .unwrap_or_else(|e| {
                    error!("outcome serialization failed: {e}");
                    Event::default().event("error").data(e.to_string())
                }),
            RunEvent::Closed(Ok(())) => Event::default().event("complete").data("ok"),
            RunEvent::Closed(Err(e)) => Event::default().event("error").data(e.to_string()),
        })
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
