//! Customer endpoints (provider pass-through)

use super::{json_body, not_found_response, payment_error_to_response, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use pay_core::{CreateCustomerRequest, Customer};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CreateCustomerResponse {
    pub message: String,
    pub customer: Customer,
}

/// POST /api/v1/customers/create
pub async fn create_customer(
    State(state): State<AppState>,
    body: Result<Json<CreateCustomerRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateCustomerResponse>)> {
    let request = json_body(body)?;

    let customer = state
        .customers
        .create(request)
        .await
        .map_err(|e| payment_error_to_response(e, "Failed to create customer"))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCustomerResponse {
            message: "Customer created successfully".to_string(),
            customer,
        }),
    ))
}

/// GET /api/v1/customers/{customer_id}
pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> ApiResult<Json<Customer>> {
    state
        .customers
        .get(&customer_id)
        .await
        .map(Json)
        .map_err(|e| not_found_response("Customer", e))
}
