use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors rejected before any worker is launched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("virtual user count must be greater than zero")]
    ZeroVirtualUsers,

    #[error("iteration count must be greater than zero")]
    ZeroIterations,

    #[error("run duration must be greater than zero")]
    ZeroDuration,

    #[error("SQL target requires a connection url")]
    MissingSqlUrl,

    #[error("SQL target requires a query")]
    MissingSqlQuery,

    #[error("invalid target url: {0}")]
    InvalidUrl(String),

    #[error("unsupported url scheme `{0}` (only `http` is supported)")]
    UnsupportedScheme(String),
}

/// Immutable configuration for a single run.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub virtual_users: u32,
    #[serde(rename = "terminationPolicy")]
    pub termination: TerminationPolicy,
    #[serde_as(as = "DurationSeconds")]
    #[serde(rename = "rampUpSeconds")]
    pub ramp_up: Duration,
    pub target: TargetParams,
}

impl RunConfig {
    /// Reject invalid configurations up front; the scheduler divides by
    /// `virtual_users` and must never see zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.virtual_users == 0 {
            return Err(ConfigError::ZeroVirtualUsers);
        }
        match self.termination {
            TerminationPolicy::Iterations(0) => return Err(ConfigError::ZeroIterations),
            TerminationPolicy::Duration(d) if d.is_zero() => {
                return Err(ConfigError::ZeroDuration)
            }
            _ => {}
        }
        match &self.target {
            TargetParams::Sql(sql) => {
                if sql.url.is_empty() {
                    return Err(ConfigError::MissingSqlUrl);
                }
                if sql.query.trim().is_empty() {
                    return Err(ConfigError::MissingSqlQuery);
                }
            }
            TargetParams::Http(http) => {
                let url = Url::parse(&http.url)
                    .map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
                if url.scheme() != "http" {
                    return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
                }
                if url.host_str().is_none() {
                    return Err(ConfigError::InvalidUrl("missing host".to_string()));
                }
            }
        }
        Ok(())
    }
}

/// When a worker's loop stops: after a fixed number of iterations, or
/// once a wall-clock duration has elapsed.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationPolicy {
    #[serde(rename = "iterations")]
    Iterations(u32),
    #[serde(rename = "durationSeconds")]
    Duration(#[serde_as(as = "DurationSeconds")] Duration),
}

/// Protocol-specific target parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "lowercase")]
pub enum TargetParams {
    Sql(SqlTarget),
    Http(HttpTarget),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlTarget {
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpTarget {
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    /// Optional JSON body for POST requests. An empty body degrades to a
    /// body-less request.
    #[serde(default)]
    pub body: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}
