//! Shared state, response bodies and error mapping

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::error::ReferralError;
use crate::mailer::Mailer;
use crate::templates::TemplateStore;

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn TemplateStore>,
    pub mailer: Arc<dyn Mailer>,
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(msg: &str) -> Self {
        Self {
            error: msg.to_string(),
        }
    }
}

/// `{ "success": true }`
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

/// Map a domain error onto a status and body
///
/// Server-side failures are logged and reported as `failure` only.
pub fn api_error(err: ReferralError, failure: &str) -> (StatusCode, Json<ApiError>) {
    match err {
        ReferralError::Validation(e) => (StatusCode::BAD_REQUEST, Json(ApiError::new(&e.to_string()))),
        ReferralError::NotFound(_) => (StatusCode::NOT_FOUND, Json(ApiError::new("Template not found"))),
        other => {
            error!(error = %other, "{}", failure);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiError::new(failure)))
        }
    }
}

pub fn bad_request(msg: &str) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError::new(msg)))
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
