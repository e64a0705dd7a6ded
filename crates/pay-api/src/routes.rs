//! # Routes
//!
//! Axum router configuration for the payment API.

use crate::handlers::{self, connect, customers, payments, refunds, subscriptions};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Service:
///   - GET  /health - Health check
///   - GET  /api - API info
///
/// - API v1 (`/api/v1`, list routes answer with or without the trailing slash):
///   - POST /payments/create?test_mode= - Create payment
///   - GET  /payments/ - List payments
///   - GET  /payments/{id} - Get payment
///   - GET  /payments/{id}/status - Provider status of a payment
///   - POST /refunds/create - Create refund
///   - GET  /refunds/ - List refunds
///   - GET  /refunds/{id} - Get refund
///   - POST /subscriptions/create - Create subscription
///   - GET  /subscriptions/ - List subscriptions
///   - GET  /subscriptions/{id} - Get subscription
///   - POST /subscriptions/{id}/cancel - Cancel at period end
///   - POST /customers/create - Create customer
///   - GET  /customers/{id} - Get customer
///   - GET  /connect/oauth - Redirect to Connect onboarding
///   - GET  /connect/oauth/callback - Onboarding return
///   - GET  /connect/accounts/{id} - Connect account info
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - allow all origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let payment_routes = Router::new()
        .route("/payments", get(payments::list_payments))
        .route("/payments/", get(payments::list_payments))
        .route("/payments/create", post(payments::create_payment))
        .route("/payments/{payment_id}", get(payments::get_payment))
        .route(
            "/payments/{payment_id}/status",
            get(payments::get_payment_status),
        );

    let refund_routes = Router::new()
        .route("/refunds", get(refunds::list_refunds))
        .route("/refunds/", get(refunds::list_refunds))
        .route("/refunds/create", post(refunds::create_refund))
        .route("/refunds/{refund_id}", get(refunds::get_refund));

    let subscription_routes = Router::new()
        .route("/subscriptions", get(subscriptions::list_subscriptions))
        .route("/subscriptions/", get(subscriptions::list_subscriptions))
        .route(
            "/subscriptions/create",
            post(subscriptions::create_subscription),
        )
        .route(
            "/subscriptions/{subscription_id}",
            get(subscriptions::get_subscription),
        )
        .route(
            "/subscriptions/{subscription_id}/cancel",
            post(subscriptions::cancel_subscription),
        );

    let customer_routes = Router::new()
        .route("/customers/create", post(customers::create_customer))
        .route("/customers/{customer_id}", get(customers::get_customer));

    let connect_routes = Router::new()
        .route("/connect/oauth", get(connect::start_oauth))
        .route("/connect/oauth/callback", get(connect::oauth_callback))
        .route("/connect/accounts/{account_id}", get(connect::get_account));

    // Combined API v1 routes
    let api_routes = Router::new()
        .merge(payment_routes)
        .merge(refund_routes)
        .merge(subscription_routes)
        .merge(customer_routes)
        .merge(connect_routes);

    // Combine all routes
    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/api", get(handlers::api_info))
        // API v1
        .nest("/api/v1", api_routes)
        .fallback(handlers::not_found)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
