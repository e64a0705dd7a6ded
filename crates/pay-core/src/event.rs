//! # Provider Events
//!
//! Normalised provider notifications. The services know how to apply them to
//! their records, but no HTTP endpoint delivers them yet: the hooks stay
//! disabled until webhook signature verification exists.

use serde::{Deserialize, Serialize};

/// Event types the services react to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderEventType {
    /// `payment_intent.succeeded`
    PaymentSucceeded,
    /// `payment_intent.payment_failed`
    PaymentFailed,
    /// `customer.subscription.updated`
    SubscriptionUpdated,
    /// `customer.subscription.deleted`
    SubscriptionDeleted,
    /// Anything else (passthrough)
    Unknown(String),
}

impl ProviderEventType {
    /// Map a provider event type string
    pub fn from_provider(event_type: &str) -> Self {
        match event_type {
            "payment_intent.succeeded" => ProviderEventType::PaymentSucceeded,
            "payment_intent.payment_failed" => ProviderEventType::PaymentFailed,
            "customer.subscription.updated" => ProviderEventType::SubscriptionUpdated,
            "customer.subscription.deleted" => ProviderEventType::SubscriptionDeleted,
            other => ProviderEventType::Unknown(other.to_string()),
        }
    }
}

/// A parsed provider event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderEvent {
    /// Event id from provider
    pub event_id: String,
    pub event_type: ProviderEventType,
    /// Id of the provider object the event is about (payment intent, subscription)
    pub object_id: String,
    /// Status reported on the object, if it carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_status: Option<String>,
}
