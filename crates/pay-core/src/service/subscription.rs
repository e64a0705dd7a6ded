//! # Subscription Service
//!
//! Local status at creation is derived from whether a trial was requested,
//! not from the provider's reported status. The two can disagree (e.g. the
//! provider reports `incomplete` when the first invoice needs action).

use crate::error::{PaymentError, PaymentResult};
use crate::event::{ProviderEvent, ProviderEventType};
use crate::gateway::{BoxedPaymentGateway, SubscriptionParams};
use crate::store::{paginate, InMemoryStore, ListPage, PageRequest, SharedStore};
use crate::subscription::{
    epoch_to_utc, epoch_to_utc_opt, CreateSubscriptionRequest, SubscriptionRecord,
    SubscriptionStatus,
};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub struct SubscriptionService {
    gateway: BoxedPaymentGateway,
    store: SharedStore<SubscriptionRecord>,
}

impl SubscriptionService {
    pub fn new(gateway: BoxedPaymentGateway) -> Self {
        Self::with_store(gateway, InMemoryStore::shared())
    }

    pub fn with_store(
        gateway: BoxedPaymentGateway,
        store: SharedStore<SubscriptionRecord>,
    ) -> Self {
        Self { gateway, store }
    }

    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn create(
        &self,
        request: CreateSubscriptionRequest,
    ) -> PaymentResult<SubscriptionRecord> {
        request.validate()?;
        let trial_days = request.trial_days();
        let params = SubscriptionParams {
            customer_id: request.customer_id.clone(),
            price_id: request.price_id.clone(),
            quantity: request.quantity,
            trial_period_days: trial_days,
            metadata: request.metadata.clone(),
        };

        let subscription = self.gateway.create_subscription(&params).await?;

        let status = if trial_days.is_some() {
            SubscriptionStatus::Trialing
        } else {
            SubscriptionStatus::Active
        };
        if SubscriptionStatus::from_provider(&subscription.status) != Some(status) {
            warn!(
                "Local status {:?} differs from provider status {} for {}",
                status, subscription.status, subscription.id
            );
        }

        let now = Utc::now();
        let record = SubscriptionRecord {
            id: Uuid::new_v4().to_string(),
            customer_id: request.customer_id,
            status,
            current_period_start: epoch_to_utc(subscription.current_period_start)?,
            current_period_end: epoch_to_utc(subscription.current_period_end)?,
            trial_start: epoch_to_utc_opt(subscription.trial_start)?,
            trial_end: epoch_to_utc_opt(subscription.trial_end)?,
            cancel_at_period_end: subscription.cancel_at_period_end,
            canceled_at: epoch_to_utc_opt(subscription.canceled_at)?,
            stripe_subscription_id: Some(subscription.id),
            metadata: request.metadata,
            created_at: now,
            updated_at: now,
        };
        self.store.put(record.clone()).await?;

        info!(
            "Created subscription: id={}, provider={:?}, status={:?}",
            record.id, record.stripe_subscription_id, record.status
        );
        Ok(record)
    }

    pub async fn get(&self, subscription_id: &str) -> PaymentResult<Option<SubscriptionRecord>> {
        self.store.get(subscription_id).await
    }

    pub async fn list(
        &self,
        customer_id: Option<&str>,
        page: PageRequest,
    ) -> PaymentResult<ListPage<SubscriptionRecord>> {
        let records = self
            .store
            .list(&|s: &SubscriptionRecord| customer_id.map_or(true, |c| s.customer_id == c))
            .await?;
        Ok(paginate(records, page))
    }

    /// Cancel at period end at the provider and mark the local record canceled
    #[instrument(skip(self))]
    pub async fn cancel(&self, subscription_id: &str) -> PaymentResult<SubscriptionRecord> {
        let record = self
            .get(subscription_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Subscription", subscription_id))?;

        let provider_id = record.stripe_subscription_id.ok_or_else(|| {
            PaymentError::Internal(format!(
                "subscription {} has no provider reference",
                subscription_id
            ))
        })?;

        let canceled = self.gateway.cancel_subscription(&provider_id).await?;
        let cancel_at_period_end = canceled.cancel_at_period_end;
        let canceled_at = epoch_to_utc_opt(canceled.canceled_at)?;

        let updated = self
            .store
            .update(
                subscription_id,
                Box::new(move |s: &mut SubscriptionRecord| {
                    s.transition(SubscriptionStatus::Canceled);
                    s.cancel_at_period_end = cancel_at_period_end;
                    s.canceled_at = canceled_at;
                }),
            )
            .await?
            .ok_or_else(|| PaymentError::not_found("Subscription", subscription_id))?;

        info!("Canceled subscription: id={}", updated.id);
        Ok(updated)
    }

    /// Set a new status; `None` if the subscription does not exist
    pub async fn update_status(
        &self,
        subscription_id: &str,
        status: SubscriptionStatus,
    ) -> PaymentResult<Option<SubscriptionRecord>> {
        self.store
            .update(
                subscription_id,
                Box::new(move |s: &mut SubscriptionRecord| s.transition(status)),
            )
            .await
    }

    /// Apply a provider subscription notification to the matching record
    pub async fn apply_event(
        &self,
        event: &ProviderEvent,
    ) -> PaymentResult<Option<SubscriptionRecord>> {
        let status = match &event.event_type {
            ProviderEventType::SubscriptionDeleted => SubscriptionStatus::Canceled,
            ProviderEventType::SubscriptionUpdated => {
                match event
                    .object_status
                    .as_deref()
                    .and_then(SubscriptionStatus::from_provider)
                {
                    Some(status) => status,
                    None => {
                        debug!("Ignoring subscription status {:?}", event.object_status);
                        return Ok(None);
                    }
                }
            }
            _ => return Ok(None),
        };

        let provider_id = event.object_id.as_str();
        let matching = self
            .store
            .list(&|s: &SubscriptionRecord| {
                s.stripe_subscription_id.as_deref() == Some(provider_id)
            })
            .await?;

        match matching.first() {
            Some(record) => self.update_status(&record.id, status).await,
            None => Ok(None),
        }
    }
}
