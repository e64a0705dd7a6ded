//! # pay-stripe
//!
//! Stripe implementation of `pay_core::PaymentGateway`.
//!
//! `StripeClient` talks to the Stripe REST API with form-encoded requests:
//! - Payment intents (including an auto-confirmed test path, refused for live keys)
//! - Customers
//! - Connect accounts and onboarding links
//! - Refunds
//! - Subscriptions (cancel at period end)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_stripe::{StripeClient, StripeConfig};
//! use pay_core::{BoxedPaymentGateway, PaymentService};
//! use std::sync::Arc;
//!
//! // Create client from environment
//! let gateway: BoxedPaymentGateway = Arc::new(StripeClient::new(StripeConfig::from_env()?)?);
//!
//! let payments = PaymentService::new(gateway.clone());
//! ```

pub mod client;
pub mod config;
pub mod types;
pub mod webhook;

// Re-exports
pub use client::StripeClient;
pub use config::StripeConfig;
pub use webhook::{parse_event, HANDLED_EVENT_TYPES};
