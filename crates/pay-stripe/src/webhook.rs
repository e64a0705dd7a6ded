//! # Stripe Events
//!
//! Turns a Stripe event payload into a `ProviderEvent`. No signature check is
//! performed, so nothing may feed untrusted payloads through here.

use crate::types::StripeEvent;
use pay_core::{PaymentError, PaymentResult, ProviderEvent, ProviderEventType};
use tracing::debug;

/// Event types the services react to
pub const HANDLED_EVENT_TYPES: &[&str] = &[
    "payment_intent.succeeded",
    "payment_intent.payment_failed",
    "customer.subscription.updated",
    "customer.subscription.deleted",
];

/// Parse a Stripe event body
pub fn parse_event(payload: &[u8]) -> PaymentResult<ProviderEvent> {
    let event: StripeEvent = serde_json::from_slice(payload)
        .map_err(|e| PaymentError::Serialization(format!("Failed to parse event: {}", e)))?;

    let object = &event.data.object;
    let object_id = object
        .get("id")
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| PaymentError::Serialization("Event object has no id".to_string()))?;

    let object_status = object
        .get("status")
        .and_then(|v| v.as_str())
        .map(String::from);

    debug!("Parsed Stripe event: id={}, type={}", event.id, event.event_type);

    Ok(ProviderEvent {
        event_id: event.id,
        event_type: ProviderEventType::from_provider(&event.event_type),
        object_id,
        object_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subscription_update() {
        let payload = br#"{
            "id": "evt_1",
            "type": "customer.subscription.updated",
            "created": 1700000000,
            "data": {"object": {"id": "sub_1", "object": "subscription", "status": "past_due"}}
        }"#;
        let event = parse_event(payload).unwrap();
        assert_eq!(event.event_id, "evt_1");
        assert_eq!(event.event_type, ProviderEventType::SubscriptionUpdated);
        assert_eq!(event.object_id, "sub_1");
        assert_eq!(event.object_status.as_deref(), Some("past_due"));
    }

    #[test]
    fn test_unhandled_type_passes_through() {
        let payload = br#"{"id": "evt_2", "type": "invoice.paid", "data": {"object": {"id": "in_1"}}}"#;
        let event = parse_event(payload).unwrap();
        assert_eq!(event.event_type, ProviderEventType::Unknown("invoice.paid".into()));
        assert!(!HANDLED_EVENT_TYPES.contains(&"invoice.paid"));
    }

    #[test]
    fn test_malformed_payload() {
        assert!(parse_event(b"not json").is_err());
        assert!(parse_event(br#"{"id": "evt_3", "type": "x", "data": {"object": {}}}"#).is_err());
    }
}
