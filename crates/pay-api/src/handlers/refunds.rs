//! Refund endpoints

use super::{
    bad_request, json_body, payment_error_to_response, query_params, ApiResult,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use pay_core::{CreateRefundRequest, PaymentError, RefundRecord};
use serde::{Deserialize, Serialize};
use tracing::instrument;

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Deserialize)]
pub struct RefundListQuery {
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Serialize)]
pub struct CreateRefundResponse {
    pub message: String,
    pub refund: RefundRecord,
}

#[derive(Debug, Serialize)]
pub struct RefundListResponse {
    pub refunds: Vec<RefundRecord>,
    pub total: usize,
    /// Always false; the listing is truncated to `limit` without a cursor
    pub has_more: bool,
}

/// POST /api/v1/refunds/create
#[instrument(skip_all)]
pub async fn create_refund(
    State(state): State<AppState>,
    body: Result<Json<CreateRefundRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateRefundResponse>)> {
    let request = json_body(body)?;

    let refund = state
        .refunds
        .create(request)
        .await
        .map_err(|e| payment_error_to_response(e, "Failed to create refund"))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRefundResponse {
            message: "Refund created successfully".to_string(),
            refund,
        }),
    ))
}

/// GET /api/v1/refunds/{refund_id}
pub async fn get_refund(
    State(state): State<AppState>,
    Path(refund_id): Path<String>,
) -> ApiResult<Json<RefundRecord>> {
    let refund = state
        .refunds
        .get(&refund_id)
        .await
        .map_err(|e| payment_error_to_response(e, "Failed to get refund"))?
        .ok_or_else(|| {
            payment_error_to_response(
                PaymentError::not_found("Refund", &refund_id),
                "Failed to get refund",
            )
        })?;

    Ok(Json(refund))
}

/// GET /api/v1/refunds/
pub async fn list_refunds(
    State(state): State<AppState>,
    query: Result<Query<RefundListQuery>, QueryRejection>,
) -> ApiResult<Json<RefundListResponse>> {
    let query = query_params(query)?;
    if !(1..=MAX_PAGE_SIZE).contains(&query.limit) {
        return Err(bad_request(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    let payment_intent_id = query.payment_intent_id.as_deref().filter(|id| !id.is_empty());
    let refunds = state
        .refunds
        .list(payment_intent_id, query.limit as usize)
        .await
        .map_err(|e| payment_error_to_response(e, "Failed to list refunds"))?;

    Ok(Json(RefundListResponse {
        total: refunds.len(),
        refunds,
        has_more: false,
    }))
}
