//! # pay-api
//!
//! HTTP API layer for stripe-b2b-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for payments, refunds, subscriptions and customers
//! - Stripe Connect onboarding redirect and callback
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api` | API info |
//! | POST | `/api/v1/payments/create` | Create payment |
//! | GET | `/api/v1/payments/{id}/status` | Provider payment status |
//! | POST | `/api/v1/refunds/create` | Create refund |
//! | POST | `/api/v1/subscriptions/{id}/cancel` | Cancel subscription |
//! | GET | `/api/v1/connect/oauth` | Start Connect onboarding |
//!
//! See [`routes::create_router`] for the full table.

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
