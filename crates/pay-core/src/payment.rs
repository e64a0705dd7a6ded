//! # Payment Types
//!
//! Local payment records mirroring provider payment intents.

use crate::error::PaymentResult;
use crate::money::{self, DEFAULT_CURRENCY};
use crate::store::Record;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status of a local payment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    Canceled,
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Canceled => "canceled",
            PaymentStatus::RequiresPaymentMethod => "requires_payment_method",
            PaymentStatus::RequiresConfirmation => "requires_confirmation",
            PaymentStatus::RequiresAction => "requires_action",
            PaymentStatus::Processing => "processing",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Request to create a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    /// Amount in major units (e.g. dollars)
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Stripe customer id
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl CreatePaymentRequest {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            description: None,
            customer_id: None,
            metadata: None,
        }
    }

    pub fn with_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Check amount and currency; returns the normalized currency code
    pub fn validate(&self) -> PaymentResult<String> {
        money::ensure_chargeable(self.amount, "amount")?;
        money::normalize_currency(&self.currency)
    }
}

/// A payment as recorded locally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub stripe_payment_intent_id: Option<String>,
    pub customer_id: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}

impl PaymentRecord {
    /// Move to a new status, bumping `updated_at`
    pub fn transition(&mut self, status: PaymentStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

impl Record for PaymentRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Result of a successful payment creation
#[derive(Debug, Clone)]
pub struct CreatedPayment {
    pub payment: PaymentRecord,
    /// Secret the frontend uses to confirm the intent
    pub client_secret: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_validate_normalizes_currency() {
        let request = CreatePaymentRequest::new(Decimal::from_str("12.50").unwrap(), "USD");
        assert_eq!(request.validate().unwrap(), "usd");
    }

    #[test]
    fn test_validate_rejects_zero_amount() {
        let request = CreatePaymentRequest::new(Decimal::ZERO, "usd");
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: CreatePaymentRequest =
            serde_json::from_str(r#"{"amount": 20.5}"#).unwrap();
        assert_eq!(request.currency, "usd");
        assert_eq!(request.amount, Decimal::from_str("20.5").unwrap());
        assert!(request.customer_id.is_none());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&PaymentStatus::RequiresPaymentMethod).unwrap();
        assert_eq!(json, "\"requires_payment_method\"");
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }
}
