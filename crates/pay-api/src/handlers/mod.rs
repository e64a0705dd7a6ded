//! # Request Handlers
//!
//! Axum request handlers for the payment API, one module per resource.
//! Shared here: the error envelope, body/query extraction errors and
//! pagination parameters.

pub mod connect;
pub mod customers;
pub mod payments;
pub mod refunds;
pub mod subscriptions;

use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use pay_core::{PageRequest, PaymentError};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

// =============================================================================
// Errors
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<T, ApiError>;

pub fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(message, 400)),
    )
}

/// Map a domain error to a response.
///
/// Server-side failures report `context` as the error and the underlying
/// message as details; client errors report the error itself.
pub fn payment_error_to_response(err: PaymentError, context: &str) -> ApiError {
    let code = err.status_code();
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let response = if status.is_server_error() {
        error!("{}: {}", context, err);
        ErrorResponse::new(context, code).with_details(err.to_string())
    } else {
        warn!("{}: {}", context, err);
        ErrorResponse::new(err.to_string(), code)
    };
    (status, Json(response))
}

/// Any failure mapped to 404 (lookups that pass straight through to the provider)
pub fn not_found_response(entity: &str, err: PaymentError) -> ApiError {
    warn!("{} lookup failed: {}", entity, err);
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(format!("{} not found: {}", entity, err), 404)),
    )
}

/// Unwrap a JSON body, turning every rejection into a 400
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| bad_request(format!("Invalid request body: {}", rejection.body_text())))
}

/// Unwrap query parameters, turning every rejection into a 400
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| bad_request(format!("Invalid query: {}", rejection.body_text())))
}

// =============================================================================
// Pagination
// =============================================================================

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// `?customer_id=&page=&per_page=`
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl ListQuery {
    pub fn page_request(&self) -> ApiResult<PageRequest> {
        if self.page < 1 {
            return Err(bad_request("page must be at least 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.per_page) {
            return Err(bad_request(format!(
                "per_page must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(PageRequest::new(self.page, self.per_page))
    }

    /// Empty `customer_id=` means no filter
    pub fn customer_filter(&self) -> Option<&str> {
        self.customer_id.as_deref().filter(|c| !c.is_empty())
    }
}

// =============================================================================
// Service endpoints
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "stripe_configured": state.stripe_configured,
        "provider": state.gateway.provider_name(),
        "service": state.config.app_name,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// API info
pub async fn api_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "message": format!("Welcome to {}", state.config.app_name),
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
        "api": "/api/v1"
    }))
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not Found",
            "message": "The requested resource was not found",
            "path": uri.path()
        })),
    )
}
