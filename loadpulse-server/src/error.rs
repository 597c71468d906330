use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use loadpulse_core::ConfigError;
use thiserror::Error;

/// Domain errors at the HTTP boundary, mapped onto standard status
/// codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("bad gateway: {0}")]
    BadGateway(String),

    #[error("gateway timeout: {0}")]
    GatewayTimeout(String),
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        use ApiError::*;
        match self {
            NotFound(_) => StatusCode::NOT_FOUND,
            BadRequest(_) => StatusCode::BAD_REQUEST,
            Forbidden(_) => StatusCode::FORBIDDEN,
            Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BadGateway(_) => StatusCode::BAD_GATEWAY,
            GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
