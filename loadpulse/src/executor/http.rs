//! HTTP request executor over a raw hyper connection.
//!
//! A pooled client would hide connection establishment cost, which is
//! one of the measurements, so every iteration dials its own TCP
//! connection and hands it to hyper directly. Plain `http` only.
use super::{IterationContext, RequestExecutor};
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{CONTENT_TYPE, HOST};
use hyper::{Method, Request};
use hyper_util::rt::TokioIo;
use loadpulse_core::{Failure, HttpMethod, HttpTarget, RawMeasure};
use std::time::Instant;
use tokio::net::TcpStream;
#[allow(unused_imports)]
use tracing::{debug, trace};
use url::Url;

pub struct HttpExecutor {
    target: HttpTarget,
}

impl HttpExecutor {
    pub fn new(target: HttpTarget) -> Self {
        Self { target }
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, _ctx: &IterationContext) -> Result<RawMeasure, Failure> {
        let url = Url::parse(&self.target.url)
            .map_err(|e| Failure::new("BAD_URL", e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| Failure::new("BAD_URL", "missing host"))?
            .to_string();
        let port = url.port_or_known_default().unwrap_or(80);
        let host_header = if port == 80 {
            host.clone()
        } else {
            format!("{host}:{port}")
        };

        let started = Instant::now();
        let stream = TcpStream::connect((host.as_str(), port))
            .await
            .map_err(|e| Failure::new("CONNECT", e.to_string()))?;
        let connect = started.elapsed();

        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .map_err(http_failure)?;
        // Drive the connection until the response is done; errors here
        // surface through send_request/collect below.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let path = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        let (method, body) = match (self.target.method, &self.target.body) {
            (HttpMethod::Post, Some(map)) if !map.is_empty() => {
                let encoded = serde_json::to_vec(map)
                    .map_err(|e| Failure::new("BAD_BODY", e.to_string()))?;
                (Method::POST, Bytes::from(encoded))
            }
            // An empty body degrades to a body-less request.
            (HttpMethod::Post, _) => (Method::POST, Bytes::new()),
            (HttpMethod::Get, _) => (Method::GET, Bytes::new()),
        };
        let bytes_sent = body.len() as u64;

        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(HOST, host_header);
        if bytes_sent > 0 {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(Full::new(body))
            .map_err(|e| Failure::new("BAD_REQUEST", e.to_string()))?;

        let response = sender.send_request(request).await.map_err(http_failure)?;
        let time_to_first_byte = started.elapsed();

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text")
            .to_string();

        let collected = response
            .into_body()
            .collect()
            .await
            .map_err(http_failure)?
            .to_bytes();
        let total = started.elapsed();

        if !status.is_success() {
            return Err(Failure::new(
                status.as_str(),
                format!("target responded with status {status}"),
            ));
        }

        Ok(RawMeasure {
            connect,
            time_to_first_byte,
            total,
            bytes_sent,
            bytes_received: collected.len() as u64,
            target_name: None,
            target_version: None,
            content_type,
            rows: parse_rows(&collected),
        })
    }
}

fn http_failure(err: hyper::Error) -> Failure {
    Failure::new("HTTP", err.to_string())
}

/// Best-effort payload materialization: a JSON array becomes the row
/// set, a JSON object becomes a single row, anything else is opaque.
fn parse_rows(body: &[u8]) -> Vec<serde_json::Value> {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Array(rows)) => rows,
        Ok(value @ serde_json::Value::Object(_)) => vec![value],
        _ => vec![],
    }
}
