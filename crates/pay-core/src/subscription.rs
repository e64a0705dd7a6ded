//! # Subscription Types

use crate::error::{PaymentError, PaymentResult};
use crate::store::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status of a local subscription record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    Incomplete,
    IncompleteExpired,
    PastDue,
    Trialing,
    Unpaid,
}

impl SubscriptionStatus {
    /// Map a provider status string; unknown values yield `None`
    pub fn from_provider(status: &str) -> Option<Self> {
        match status {
            "active" => Some(SubscriptionStatus::Active),
            "canceled" => Some(SubscriptionStatus::Canceled),
            "incomplete" => Some(SubscriptionStatus::Incomplete),
            "incomplete_expired" => Some(SubscriptionStatus::IncompleteExpired),
            "past_due" => Some(SubscriptionStatus::PastDue),
            "trialing" => Some(SubscriptionStatus::Trialing),
            "unpaid" => Some(SubscriptionStatus::Unpaid),
            _ => None,
        }
    }
}

fn default_quantity() -> u32 {
    1
}

/// Request to subscribe a customer to a price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub customer_id: String,
    pub price_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub trial_period_days: Option<u32>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl CreateSubscriptionRequest {
    pub fn new(customer_id: impl Into<String>, price_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            price_id: price_id.into(),
            quantity: 1,
            trial_period_days: None,
            metadata: None,
        }
    }

    pub fn with_trial(mut self, days: u32) -> Self {
        self.trial_period_days = Some(days);
        self
    }

    /// Trial length if one was actually requested (zero days means none)
    pub fn trial_days(&self) -> Option<u32> {
        self.trial_period_days.filter(|days| *days > 0)
    }

    pub fn validate(&self) -> PaymentResult<()> {
        if self.customer_id.trim().is_empty() {
            return Err(PaymentError::validation("customer_id must not be empty"));
        }
        if self.price_id.trim().is_empty() {
            return Err(PaymentError::validation("price_id must not be empty"));
        }
        if self.quantity == 0 {
            return Err(PaymentError::validation("quantity must be greater than 0"));
        }
        Ok(())
    }
}

/// A subscription as recorded locally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: String,
    pub customer_id: String,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub trial_start: Option<DateTime<Utc>>,
    pub trial_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<DateTime<Utc>>,
    pub stripe_subscription_id: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionRecord {
    pub fn transition(&mut self, status: SubscriptionStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

impl Record for SubscriptionRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Convert a provider epoch-seconds timestamp
pub fn epoch_to_utc(seconds: i64) -> PaymentResult<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        PaymentError::Serialization(format!("timestamp {} is out of range", seconds))
    })
}

/// Convert an optional provider timestamp
pub fn epoch_to_utc_opt(seconds: Option<i64>) -> PaymentResult<Option<DateTime<Utc>>> {
    seconds.map(epoch_to_utc).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_provider() {
        assert_eq!(
            SubscriptionStatus::from_provider("past_due"),
            Some(SubscriptionStatus::PastDue)
        );
        assert_eq!(SubscriptionStatus::from_provider("paused"), None);
    }

    #[test]
    fn test_zero_day_trial_is_no_trial() {
        let request = CreateSubscriptionRequest::new("cus_1", "price_1").with_trial(0);
        assert_eq!(request.trial_days(), None);
        assert_eq!(request.with_trial(14).trial_days(), Some(14));
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        let request: CreateSubscriptionRequest =
            serde_json::from_str(r#"{"customer_id": "cus_1", "price_id": "price_1"}"#).unwrap();
        assert_eq!(request.quantity, 1);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_ids() {
        assert!(CreateSubscriptionRequest::new("", "price_1").validate().is_err());
        assert!(CreateSubscriptionRequest::new("cus_1", " ").validate().is_err());
    }

    #[test]
    fn test_epoch_conversion() {
        assert_eq!(epoch_to_utc(0).unwrap().timestamp(), 0);
        assert!(epoch_to_utc(i64::MAX).is_err());
        assert_eq!(epoch_to_utc_opt(None).unwrap(), None);
    }
}
