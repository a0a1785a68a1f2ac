/// Unified error handling module
use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Unified error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("External API error: {0}")]
    ExternalApi(#[from] reqwest::Error),
    #[error("Upstream returned HTTP {status} for {url}")]
    Upstream { status: u16, url: String },
    #[error("Malformed upstream payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl ApiError {
    /// Stable code exposed to clients
    pub fn code(&self) -> &'static str {
        let upstream_status = match self {
            ApiError::ExternalApi(e) => e.status().map(|s| s.as_u16()),
            ApiError::Upstream { status, .. } => Some(*status),
            ApiError::Decode(_) => return "UPSTREAM_DECODE",
            ApiError::NotFound(_) => return "NOT_FOUND",
            ApiError::InvalidInput(_) => return "INVALID_INPUT",
            ApiError::Internal(_) => return "INTERNAL_ERROR",
        };
        match upstream_status {
            Some(403) => "UPSTREAM_403",
            Some(404) => "UPSTREAM_404",
            Some(429) => "UPSTREAM_429",
            Some(500..=599) => "UPSTREAM_5XX",
            _ => "UPSTREAM_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_response = ErrorResponse {
            ok: false,
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };

        // Always return HTTP 200 with ok=false as per requirements
        (StatusCode::OK, Json(error_response)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
