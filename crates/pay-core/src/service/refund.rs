//! # Refund Service

use crate::error::PaymentResult;
use crate::gateway::{BoxedPaymentGateway, RefundParams};
use crate::money;
use crate::refund::{CreateRefundRequest, RefundRecord};
use crate::store::{InMemoryStore, SharedStore};
use tracing::{info, instrument};

pub struct RefundService {
    gateway: BoxedPaymentGateway,
    store: SharedStore<RefundRecord>,
}

impl RefundService {
    pub fn new(gateway: BoxedPaymentGateway) -> Self {
        Self::with_store(gateway, InMemoryStore::shared())
    }

    pub fn with_store(gateway: BoxedPaymentGateway, store: SharedStore<RefundRecord>) -> Self {
        Self { gateway, store }
    }

    /// Refund a payment intent, fully when no amount is given
    #[instrument(skip(self, request), fields(payment_intent_id = %request.payment_intent_id))]
    pub async fn create(&self, request: CreateRefundRequest) -> PaymentResult<RefundRecord> {
        request.validate()?;
        let params = RefundParams {
            payment_intent_id: request.payment_intent_id.clone(),
            amount: request.amount.map(money::to_minor_units).transpose()?,
            reason: request.reason,
        };

        let refund = self.gateway.create_refund(&params).await?;

        let record = RefundRecord {
            id: refund.id,
            payment_intent_id: refund
                .payment_intent
                .unwrap_or(request.payment_intent_id),
            amount: money::from_minor_units(refund.amount),
            currency: refund.currency,
            status: refund.status,
            reason: request.reason,
            created_at: refund.created,
        };
        self.store.put(record.clone()).await?;

        info!(
            "Created refund: id={}, amount={} {}",
            record.id, record.amount, record.currency
        );
        Ok(record)
    }

    pub async fn get(&self, refund_id: &str) -> PaymentResult<Option<RefundRecord>> {
        self.store.get(refund_id).await
    }

    /// Newest-first refunds, truncated to `limit`
    pub async fn list(
        &self,
        payment_intent_id: Option<&str>,
        limit: usize,
    ) -> PaymentResult<Vec<RefundRecord>> {
        let mut refunds = self
            .store
            .list(&|r: &RefundRecord| {
                payment_intent_id.map_or(true, |pi| r.payment_intent_id == pi)
            })
            .await?;
        refunds.truncate(limit);
        Ok(refunds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::PaymentGateway;
    use crate::gateway::PaymentIntentParams;
    use crate::mock::{GatewayCall, MockGateway};
    use crate::refund::RefundReason;
    use crate::PaymentError;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Arc;

    async fn setup() -> (Arc<MockGateway>, RefundService, String) {
        let gateway = Arc::new(MockGateway::new());
        let intent = gateway
            .create_payment_intent(&PaymentIntentParams {
                amount: 5000,
                currency: "usd".into(),
                customer_id: None,
                description: None,
                metadata: None,
            })
            .await
            .unwrap();
        let service = RefundService::new(gateway.clone());
        (gateway, service, intent.id)
    }

    fn refund_calls(gateway: &MockGateway) -> Vec<RefundParams> {
        gateway
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::CreateRefund(params) => Some(params),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_full_refund_omits_amount() {
        let (gateway, service, intent_id) = setup().await;
        let refund = service
            .create(CreateRefundRequest::full(&intent_id))
            .await
            .unwrap();

        assert_eq!(refund_calls(&gateway)[0].amount, None);
        assert_eq!(refund.amount, Decimal::from_str("50.00").unwrap());
        assert_eq!(refund.payment_intent_id, intent_id);
        assert_eq!(refund.status, "succeeded");
    }

    #[tokio::test]
    async fn test_partial_refund_converts_both_ways() {
        let (gateway, service, intent_id) = setup().await;
        let refund = service
            .create(
                CreateRefundRequest::partial(&intent_id, Decimal::from_str("12.34").unwrap())
                    .with_reason(RefundReason::Duplicate),
            )
            .await
            .unwrap();

        let params = &refund_calls(&gateway)[0];
        assert_eq!(params.amount, Some(1234));
        assert_eq!(params.reason, Some(RefundReason::Duplicate));
        assert_eq!(refund.amount, Decimal::from_str("12.34").unwrap());
        assert_eq!(refund.reason, Some(RefundReason::Duplicate));
    }

    #[tokio::test]
    async fn test_sub_cent_partial_refund_never_reaches_provider() {
        let (gateway, service, intent_id) = setup().await;
        let err = service
            .create(CreateRefundRequest::partial(
                &intent_id,
                Decimal::from_str("0.004").unwrap(),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Validation(_)));
        assert_eq!(err.status_code(), 400);
        assert!(refund_calls(&gateway).is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let (gateway, service, intent_id) = setup().await;
        gateway.fail_with("Charge has already been refunded.");

        let err = service
            .create(CreateRefundRequest::full(&intent_id))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::ProviderError { .. }));
        assert!(service.list(None, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let (gateway, service, intent_id) = setup().await;
        let first = service
            .create(CreateRefundRequest::partial(&intent_id, Decimal::ONE))
            .await
            .unwrap();
        service
            .create(CreateRefundRequest::partial(&intent_id, Decimal::TWO))
            .await
            .unwrap();

        let other_intent = gateway
            .create_payment_intent(&PaymentIntentParams {
                amount: 700,
                currency: "eur".into(),
                customer_id: None,
                description: None,
                metadata: None,
            })
            .await
            .unwrap();
        service
            .create(CreateRefundRequest::full(&other_intent.id))
            .await
            .unwrap();

        assert_eq!(service.get(&first.id).await.unwrap(), Some(first.clone()));
        assert!(service.get("re_missing").await.unwrap().is_none());

        assert_eq!(service.list(None, 10).await.unwrap().len(), 3);
        assert_eq!(service.list(Some(&intent_id), 10).await.unwrap().len(), 2);
        assert_eq!(service.list(None, 1).await.unwrap().len(), 1);
        assert!(service.list(Some("pi_none"), 10).await.unwrap().is_empty());
    }
}
