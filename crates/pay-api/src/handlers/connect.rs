//! Stripe Connect onboarding endpoints

use super::{not_found_response, payment_error_to_response, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Json,
};
use pay_core::{ConnectAccountInfo, OAuthCallbackOutcome};
use std::collections::HashMap;
use tracing::{info, instrument};

/// GET /api/v1/connect/oauth
///
/// Creates an express account and redirects (307) to its onboarding link.
#[instrument(skip(state))]
pub async fn start_oauth(State(state): State<AppState>) -> ApiResult<Redirect> {
    let link = state
        .connect
        .start_onboarding(&state.config.oauth_redirect_uri)
        .await
        .map_err(|e| payment_error_to_response(e, "Failed to initiate OAuth"))?;

    Ok(Redirect::temporary(&link.url))
}

/// GET /api/v1/connect/oauth/callback
pub async fn oauth_callback(
    Query(params): Query<HashMap<String, String>>,
) -> Json<OAuthCallbackOutcome> {
    let outcome = OAuthCallbackOutcome::from_params(&params);
    info!("OAuth callback: status={}", outcome.status);
    Json(outcome)
}

/// GET /api/v1/connect/accounts/{account_id}
pub async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> ApiResult<Json<ConnectAccountInfo>> {
    state
        .connect
        .account(&account_id)
        .await
        .map(Json)
        .map_err(|e| not_found_response("Account", e))
}
