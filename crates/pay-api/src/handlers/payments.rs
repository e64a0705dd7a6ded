//! Payment endpoints

use super::{json_body, payment_error_to_response, query_params, ApiResult, ListQuery};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use pay_core::{CreatePaymentRequest, PaymentError, PaymentRecord};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Default, Deserialize)]
pub struct CreatePaymentQuery {
    /// Auto-confirm with a test card
    #[serde(default)]
    pub test_mode: bool,
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentResponse {
    pub message: String,
    pub payment: PaymentRecord,
    pub client_secret: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub payment_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentListResponse {
    pub payments: Vec<PaymentRecord>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
}

/// POST /api/v1/payments/create
#[instrument(skip_all)]
pub async fn create_payment(
    State(state): State<AppState>,
    query: Result<Query<CreatePaymentQuery>, QueryRejection>,
    body: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatePaymentResponse>)> {
    let query = query_params(query)?;
    let request = json_body(body)?;

    let created = state
        .payments
        .create(request, query.test_mode)
        .await
        .map_err(|e| payment_error_to_response(e, "Failed to create payment"))?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePaymentResponse {
            message: "Payment created successfully".to_string(),
            payment: created.payment,
            client_secret: created.client_secret,
        }),
    ))
}

/// GET /api/v1/payments/{payment_id}
pub async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> ApiResult<Json<PaymentRecord>> {
    let payment = state
        .payments
        .get(&payment_id)
        .await
        .map_err(|e| payment_error_to_response(e, "Failed to get payment"))?
        .ok_or_else(|| {
            payment_error_to_response(
                PaymentError::not_found("Payment", &payment_id),
                "Failed to get payment",
            )
        })?;

    Ok(Json(payment))
}

/// GET /api/v1/payments/{payment_id}/status
///
/// Asks the provider rather than trusting the local record.
#[instrument(skip(state))]
pub async fn get_payment_status(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> ApiResult<Json<PaymentStatusResponse>> {
    let status = state
        .payments
        .provider_status(&payment_id)
        .await
        .map_err(|e| payment_error_to_response(e, "Failed to get payment status"))?;

    Ok(Json(PaymentStatusResponse { payment_id, status }))
}

/// GET /api/v1/payments/
pub async fn list_payments(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<PaymentListResponse>> {
    let query = query_params(query)?;
    let page = query.page_request()?;

    let listing = state
        .payments
        .list(query.customer_filter(), page)
        .await
        .map_err(|e| payment_error_to_response(e, "Failed to list payments"))?;

    Ok(Json(PaymentListResponse {
        payments: listing.items,
        total: listing.total,
        page: page.page,
        per_page: page.per_page,
    }))
}
