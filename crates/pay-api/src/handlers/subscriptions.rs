//! Subscription endpoints

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
use pay_core::{CreateSubscriptionRequest, PaymentError, SubscriptionRecord};
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub message: String,
    pub subscription: SubscriptionRecord,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionListResponse {
    pub subscriptions: Vec<SubscriptionRecord>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
}

/// POST /api/v1/subscriptions/create
#[instrument(skip_all)]
pub async fn create_subscription(
    State(state): State<AppState>,
    body: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubscriptionResponse>)> {
    let request = json_body(body)?;

    let subscription = state
        .subscriptions
        .create(request)
        .await
        .map_err(|e| payment_error_to_response(e, "Failed to create subscription"))?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse {
            message: "Subscription created successfully".to_string(),
            subscription,
        }),
    ))
}

/// GET /api/v1/subscriptions/{subscription_id}
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
) -> ApiResult<Json<SubscriptionRecord>> {
    let subscription = state
        .subscriptions
        .get(&subscription_id)
        .await
        .map_err(|e| payment_error_to_response(e, "Failed to get subscription"))?
        .ok_or_else(|| {
            payment_error_to_response(
                PaymentError::not_found("Subscription", &subscription_id),
                "Failed to get subscription",
            )
        })?;

    Ok(Json(subscription))
}

/// POST /api/v1/subscriptions/{subscription_id}/cancel
#[instrument(skip(state))]
pub async fn cancel_subscription(
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
) -> ApiResult<Json<SubscriptionResponse>> {
    let subscription = state
        .subscriptions
        .cancel(&subscription_id)
        .await
        .map_err(|e| payment_error_to_response(e, "Failed to cancel subscription"))?;

    Ok(Json(SubscriptionResponse {
        message: "Subscription cancelled successfully".to_string(),
        subscription,
    }))
}

/// GET /api/v1/subscriptions/
pub async fn list_subscriptions(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<SubscriptionListResponse>> {
    let query = query_params(query)?;
    let page = query.page_request()?;

    let listing = state
        .subscriptions
        .list(query.customer_filter(), page)
        .await
        .map_err(|e| payment_error_to_response(e, "Failed to list subscriptions"))?;

    Ok(Json(SubscriptionListResponse {
        subscriptions: listing.items,
        total: listing.total,
        page: page.page,
        per_page: page.per_page,
    }))
}
