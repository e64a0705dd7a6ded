//! # Payment Gateway Trait
//!
//! The single narrow seam between the domain services and the payment
//! provider. Every operation takes plain parameters (amounts already in minor
//! units, opaque provider ids) and returns the provider's object or fails with
//! `PaymentError::ProviderError`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   PaymentGateway (trait)                    │
//! │  ├── payment intents   create / create_test / retrieve      │
//! │  ├── customers         create / retrieve                    │
//! │  ├── connect           account create / retrieve, link      │
//! │  ├── refunds           create / retrieve                    │
//! │  └── subscriptions     create / retrieve / cancel           │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!             ┌──────────────┴──────────────┐
//!     ┌───────┴───────┐             ┌───────┴───────┐
//!     │ StripeClient  │             │  MockGateway  │
//!     │ (pay-stripe)  │             │ (tests only)  │
//!     └───────────────┘             └───────────────┘
//! ```
//!
//! There are no retries and no idempotency keys: each call is attempted once
//! and failures propagate to the caller.

use crate::error::PaymentResult;
use crate::refund::RefundReason;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Core trait for payment provider implementations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent awaiting client-side confirmation.
    async fn create_payment_intent(&self, params: &PaymentIntentParams)
        -> PaymentResult<PaymentIntent>;

    /// Create and immediately confirm a payment intent with a fixed test card.
    ///
    /// Test-only: implementations must refuse this for live credentials.
    async fn create_test_payment_intent(
        &self,
        params: &PaymentIntentParams,
    ) -> PaymentResult<PaymentIntent>;

    /// Fetch the current state of a payment intent.
    async fn retrieve_payment_intent(&self, payment_intent_id: &str)
        -> PaymentResult<PaymentIntent>;

    async fn create_customer(&self, params: &CustomerParams) -> PaymentResult<Customer>;

    async fn retrieve_customer(&self, customer_id: &str) -> PaymentResult<Customer>;

    async fn create_connect_account(
        &self,
        params: &ConnectAccountParams,
    ) -> PaymentResult<ConnectAccount>;

    async fn retrieve_connect_account(&self, account_id: &str) -> PaymentResult<ConnectAccount>;

    /// Create a hosted onboarding link for a connect account.
    async fn create_account_link(&self, params: &AccountLinkParams) -> PaymentResult<AccountLink>;

    /// Refund a payment intent. Without an amount the full remainder is refunded.
    async fn create_refund(&self, params: &RefundParams) -> PaymentResult<Refund>;

    async fn retrieve_refund(&self, refund_id: &str) -> PaymentResult<Refund>;

    async fn create_subscription(&self, params: &SubscriptionParams)
        -> PaymentResult<Subscription>;

    async fn retrieve_subscription(&self, subscription_id: &str) -> PaymentResult<Subscription>;

    /// Cancel at the end of the current period (not immediately).
    async fn cancel_subscription(&self, subscription_id: &str) -> PaymentResult<Subscription>;

    /// Get the provider name (for logging and error messages).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;

// =============================================================================
// Call parameters
// =============================================================================

/// Parameters for creating a payment intent
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntentParams {
    /// Amount in minor units
    pub amount: i64,
    pub currency: String,
    pub customer_id: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerParams {
    pub email: String,
    pub name: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}

/// Parameters for creating a connect account
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectAccountParams {
    /// express, standard or custom
    pub account_type: String,
    /// ISO 3166-1 alpha-2
    pub country: String,
    pub email: Option<String>,
    /// Capabilities to request, e.g. `card_payments`
    pub capabilities: Vec<String>,
}

impl ConnectAccountParams {
    /// Express account in the US able to take card payments and receive transfers
    pub fn express_us() -> Self {
        Self {
            account_type: "express".to_string(),
            country: "US".to_string(),
            email: None,
            capabilities: vec!["card_payments".to_string(), "transfers".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountLinkParams {
    pub account_id: String,
    pub refresh_url: String,
    pub return_url: String,
    /// Usually `account_onboarding`
    pub link_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefundParams {
    pub payment_intent_id: String,
    /// Minor units; `None` refunds the full remaining amount
    pub amount: Option<i64>,
    pub reason: Option<RefundReason>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionParams {
    pub customer_id: String,
    pub price_id: String,
    pub quantity: u32,
    pub trial_period_days: Option<u32>,
    pub metadata: Option<HashMap<String, String>>,
}

// =============================================================================
// Provider objects
// =============================================================================

/// Provider payment intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Minor units
    pub amount: i64,
    pub currency: String,
    /// Provider-reported status (`requires_payment_method`, `succeeded`, ...)
    pub status: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
}

/// Provider customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Epoch seconds
    pub created: i64,
}

/// Provider connect account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectAccount {
    pub id: String,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub charges_enabled: bool,
    #[serde(default)]
    pub payouts_enabled: bool,
    #[serde(default)]
    pub requirements: Option<serde_json::Value>,
    /// Epoch seconds
    #[serde(default)]
    pub created: Option<i64>,
}

/// Provider account onboarding link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountLink {
    pub url: String,
    pub created: i64,
    pub expires_at: i64,
}

/// Provider refund
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    #[serde(default)]
    pub payment_intent: Option<String>,
    /// Minor units
    pub amount: i64,
    pub currency: String,
    /// `pending`, `succeeded`, `failed`, ...
    pub status: String,
    /// Epoch seconds
    pub created: i64,
}

/// Provider subscription (epoch-second timestamps)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub customer: String,
    pub status: String,
    pub current_period_start: i64,
    pub current_period_end: i64,
    #[serde(default)]
    pub trial_start: Option<i64>,
    #[serde(default)]
    pub trial_end: Option<i64>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub canceled_at: Option<i64>,
}
