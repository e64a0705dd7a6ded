//! # Refund Types

use crate::error::PaymentResult;
use crate::money;
use crate::store::Record;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reason attached to a refund
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundReason {
    RequestedByCustomer,
    Duplicate,
    Fraudulent,
}

impl RefundReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundReason::RequestedByCustomer => "requested_by_customer",
            RefundReason::Duplicate => "duplicate",
            RefundReason::Fraudulent => "fraudulent",
        }
    }
}

/// Request to refund a payment intent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRefundRequest {
    pub payment_intent_id: String,
    /// Major units; omit to refund the full remaining amount
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub reason: Option<RefundReason>,
}

impl CreateRefundRequest {
    pub fn full(payment_intent_id: impl Into<String>) -> Self {
        Self {
            payment_intent_id: payment_intent_id.into(),
            amount: None,
            reason: None,
        }
    }

    pub fn partial(payment_intent_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            amount: Some(amount),
            ..Self::full(payment_intent_id)
        }
    }

    pub fn with_reason(mut self, reason: RefundReason) -> Self {
        self.reason = Some(reason);
        self
    }

    pub fn validate(&self) -> PaymentResult<()> {
        if self.payment_intent_id.trim().is_empty() {
            return Err(crate::PaymentError::validation(
                "payment_intent_id must not be empty",
            ));
        }
        if let Some(amount) = self.amount {
            money::ensure_chargeable(amount, "amount")?;
        }
        Ok(())
    }
}

/// A refund as recorded locally, keyed by the provider's refund id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundRecord {
    pub id: String,
    pub payment_intent_id: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    pub currency: String,
    /// Provider-reported status
    pub status: String,
    pub reason: Option<RefundReason>,
    /// Provider epoch seconds
    pub created_at: i64,
}

impl Record for RefundRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.created_at, 0).unwrap_or_default()
    }
}
