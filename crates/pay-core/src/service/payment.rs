//! # Payment Service
//!
//! Creates payment intents at the provider and keeps a local record of each.

use crate::error::{PaymentError, PaymentResult};
use crate::event::{ProviderEvent, ProviderEventType};
use crate::gateway::{BoxedPaymentGateway, PaymentIntentParams};
use crate::money;
use crate::payment::{CreatePaymentRequest, CreatedPayment, PaymentRecord, PaymentStatus};
use crate::store::{paginate, InMemoryStore, ListPage, PageRequest, SharedStore};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub struct PaymentService {
    gateway: BoxedPaymentGateway,
    store: SharedStore<PaymentRecord>,
}

impl PaymentService {
    /// Service backed by a fresh in-memory store
    pub fn new(gateway: BoxedPaymentGateway) -> Self {
        Self::with_store(gateway, InMemoryStore::shared())
    }

    pub fn with_store(gateway: BoxedPaymentGateway, store: SharedStore<PaymentRecord>) -> Self {
        Self { gateway, store }
    }

    /// Create a payment intent and record it locally as pending.
    ///
    /// With `test_mode` the intent is confirmed immediately with a test card.
    #[instrument(skip(self, request), fields(amount = %request.amount))]
    pub async fn create(
        &self,
        request: CreatePaymentRequest,
        test_mode: bool,
    ) -> PaymentResult<CreatedPayment> {
        let currency = request.validate()?;
        let params = PaymentIntentParams {
            amount: money::to_minor_units(request.amount)?,
            currency: currency.clone(),
            customer_id: request.customer_id.clone(),
            description: request.description.clone(),
            metadata: request.metadata.clone(),
        };

        let intent = if test_mode {
            warn!("Creating auto-confirmed test payment intent");
            self.gateway.create_test_payment_intent(&params).await?
        } else {
            self.gateway.create_payment_intent(&params).await?
        };

        let now = Utc::now();
        let payment = PaymentRecord {
            id: Uuid::new_v4().to_string(),
            amount: request.amount,
            currency,
            status: PaymentStatus::Pending,
            description: request.description,
            created_at: now,
            updated_at: now,
            stripe_payment_intent_id: Some(intent.id),
            customer_id: request.customer_id,
            metadata: request.metadata,
        };
        self.store.put(payment.clone()).await?;

        info!(
            "Created payment: id={}, intent={:?}",
            payment.id, payment.stripe_payment_intent_id
        );

        Ok(CreatedPayment {
            payment,
            client_secret: intent.client_secret,
        })
    }

    pub async fn get(&self, payment_id: &str) -> PaymentResult<Option<PaymentRecord>> {
        self.store.get(payment_id).await
    }

    /// Newest-first page of payments, optionally for one customer
    pub async fn list(
        &self,
        customer_id: Option<&str>,
        page: PageRequest,
    ) -> PaymentResult<ListPage<PaymentRecord>> {
        let records = self
            .store
            .list(&|p: &PaymentRecord| {
                customer_id.map_or(true, |c| p.customer_id.as_deref() == Some(c))
            })
            .await?;
        Ok(paginate(records, page))
    }

    /// Set a new status; `None` if the payment does not exist
    pub async fn update_status(
        &self,
        payment_id: &str,
        status: PaymentStatus,
    ) -> PaymentResult<Option<PaymentRecord>> {
        self.store
            .update(payment_id, Box::new(move |p: &mut PaymentRecord| p.transition(status)))
            .await
    }

    /// Ask the provider for the current status of a payment's intent
    #[instrument(skip(self))]
    pub async fn provider_status(&self, payment_id: &str) -> PaymentResult<String> {
        let payment = self
            .get(payment_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Payment", payment_id))?;

        let intent_id = payment.stripe_payment_intent_id.ok_or_else(|| {
            PaymentError::MissingProviderReference {
                payment_id: payment_id.to_string(),
            }
        })?;

        let intent = self.gateway.retrieve_payment_intent(&intent_id).await?;
        debug!("Provider status for {}: {}", payment_id, intent.status);
        Ok(intent.status)
    }

    /// Apply a provider notification to the matching payment.
    ///
    /// Returns the updated record, or `None` when the event is irrelevant or
    /// no payment references the event's payment intent.
    pub async fn apply_event(&self, event: &ProviderEvent) -> PaymentResult<Option<PaymentRecord>> {
        let status = match event.event_type {
            ProviderEventType::PaymentSucceeded => PaymentStatus::Succeeded,
            ProviderEventType::PaymentFailed => PaymentStatus::Failed,
            _ => return Ok(None),
        };

        let intent_id = event.object_id.as_str();
        let matching = self
            .store
            .list(&|p: &PaymentRecord| p.stripe_payment_intent_id.as_deref() == Some(intent_id))
            .await?;

        match matching.first() {
            Some(payment) => self.update_status(&payment.id, status).await,
            None => {
                debug!("No payment for intent {}", intent_id);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{GatewayCall, MockGateway};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Arc;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn service() -> (Arc<MockGateway>, PaymentService) {
        let gateway = Arc::new(MockGateway::new());
        let service = PaymentService::new(gateway.clone());
        (gateway, service)
    }

    #[tokio::test]
    async fn test_create_sends_minor_units() {
        let (gateway, service) = service();
        let created = service
            .create(CreatePaymentRequest::new(dec("20.50"), "USD"), false)
            .await
            .unwrap();

        assert_eq!(created.payment.amount, dec("20.50"));
        assert_eq!(created.payment.currency, "usd");
        assert_eq!(created.payment.status, PaymentStatus::Pending);
        assert!(created.client_secret.is_some());

        match &gateway.calls()[0] {
            GatewayCall::CreatePaymentIntent { params, test_mode } => {
                assert_eq!(params.amount, 2050);
                assert_eq!(params.currency, "usd");
                assert!(!test_mode);
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_test_mode_uses_test_path() {
        let (gateway, service) = service();
        service
            .create(CreatePaymentRequest::new(dec("5"), "usd"), true)
            .await
            .unwrap();

        assert!(matches!(
            gateway.calls()[0],
            GatewayCall::CreatePaymentIntent { test_mode: true, .. }
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_amount_without_calling_provider() {
        let (gateway, service) = service();
        let err = service
            .create(CreatePaymentRequest::new(dec("-1"), "usd"), false)
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Validation(_)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_amount_that_rounds_to_zero_cents() {
        let (gateway, service) = service();
        let err = service
            .create(CreatePaymentRequest::new(dec("0.001"), "usd"), false)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid request: amount must be at least 0.01");
        assert_eq!(err.status_code(), 400);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_stores_nothing() {
        let (gateway, service) = service();
        gateway.fail_with("Your card was declined.");

        let err = service
            .create(CreatePaymentRequest::new(dec("10"), "usd"), false)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Your card was declined."));
        let page = service.list(None, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_get_after_create_is_identical() {
        let (_, service) = service();
        let created = service
            .create(
                CreatePaymentRequest::new(dec("42.00"), "eur")
                    .with_customer("cus_1")
                    .with_description("Invoice 7")
                    .with_metadata("order", "7"),
                false,
            )
            .await
            .unwrap();

        let fetched = service.get(&created.payment.id).await.unwrap().unwrap();
        assert_eq!(fetched, created.payment);
        assert!(service.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pages_newest_first() {
        let (_, service) = service();
        let mut ids = Vec::new();
        for i in 1..=5 {
            let created = service
                .create(CreatePaymentRequest::new(Decimal::from(i), "usd"), false)
                .await
                .unwrap();
            ids.push(created.payment.id);
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        ids.reverse();

        let page = service.list(None, PageRequest::new(2, 2)).await.unwrap();
        let page_ids: Vec<_> = page.items.iter().map(|p| p.id.clone()).collect();
        assert_eq!(page_ids, ids[2..4].to_vec());
        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn test_list_filter_matching_nothing_is_empty() {
        let (_, service) = service();
        service
            .create(
                CreatePaymentRequest::new(dec("1"), "usd").with_customer("cus_a"),
                false,
            )
            .await
            .unwrap();

        let page = service
            .list(Some("cus_nobody"), PageRequest::default())
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);

        let page = service.list(Some("cus_a"), PageRequest::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_update_status() {
        let (_, service) = service();
        let created = service
            .create(CreatePaymentRequest::new(dec("3"), "usd"), false)
            .await
            .unwrap();

        let updated = service
            .update_status(&created.payment.id, PaymentStatus::Succeeded)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, PaymentStatus::Succeeded);
        assert!(updated.updated_at >= created.payment.updated_at);

        assert!(service
            .update_status("missing", PaymentStatus::Failed)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_provider_status() {
        let (gateway, service) = service();
        let created = service
            .create(CreatePaymentRequest::new(dec("3"), "usd"), false)
            .await
            .unwrap();
        let intent_id = created.payment.stripe_payment_intent_id.clone().unwrap();
        gateway.set_payment_intent_status(&intent_id, "processing");

        let status = service.provider_status(&created.payment.id).await.unwrap();
        assert_eq!(status, "processing");

        let err = service.provider_status("missing").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_provider_status_without_reference() {
        let gateway = Arc::new(MockGateway::new());
        let store = InMemoryStore::shared();
        let now = Utc::now();
        store
            .put(PaymentRecord {
                id: "legacy".into(),
                amount: dec("1"),
                currency: "usd".into(),
                status: PaymentStatus::Pending,
                description: None,
                created_at: now,
                updated_at: now,
                stripe_payment_intent_id: None,
                customer_id: None,
                metadata: None,
            })
            .await
            .unwrap();
        let service = PaymentService::with_store(gateway, store);

        let err = service.provider_status("legacy").await.unwrap_err();
        assert!(matches!(err, PaymentError::MissingProviderReference { .. }));
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_apply_event_transitions_matching_payment() {
        let (_, service) = service();
        let created = service
            .create(CreatePaymentRequest::new(dec("9.99"), "usd"), false)
            .await
            .unwrap();
        let intent_id = created.payment.stripe_payment_intent_id.clone().unwrap();

        let event = ProviderEvent {
            event_id: "evt_1".into(),
            event_type: ProviderEventType::PaymentFailed,
            object_id: intent_id,
            object_status: Some("requires_payment_method".into()),
        };
        let updated = service.apply_event(&event).await.unwrap().unwrap();
        assert_eq!(updated.status, PaymentStatus::Failed);

        let unrelated = ProviderEvent {
            event_type: ProviderEventType::Unknown("charge.captured".into()),
            ..event
        };
        assert!(service.apply_event(&unrelated).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_creates_do_not_collide() {
        let (_, service) = service();
        let service = Arc::new(service);

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .create(CreatePaymentRequest::new(Decimal::from(i + 1), "usd"), false)
                        .await
                        .unwrap()
                        .payment
                        .id
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 32);
        for id in &ids {
            assert!(service.get(id).await.unwrap().is_some());
        }
        let page = service.list(None, PageRequest::new(1, 100)).await.unwrap();
        assert_eq!(page.total, 32);
    }
}
