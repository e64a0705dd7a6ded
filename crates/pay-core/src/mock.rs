//! Mock payment gateway for testing.
//!
//! An in-process `PaymentGateway` that fabricates provider objects, records
//! every call for assertions and can be switched into a failing mode.
//! Enabled for downstream crates with the `mock` feature.
//!
//! ```ignore
//! let gateway = Arc::new(MockGateway::new());
//! let payments = PaymentService::new(gateway.clone());
//!
//! gateway.fail_with("Your card was declined.");
//! assert!(payments.create(request, false).await.is_err());
//! ```

use crate::error::{PaymentError, PaymentResult};
use crate::gateway::{
    AccountLink, AccountLinkParams, ConnectAccount, ConnectAccountParams, Customer,
    CustomerParams, PaymentGateway, PaymentIntent, PaymentIntentParams, Refund, RefundParams,
    Subscription, SubscriptionParams,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

const SECONDS_PER_DAY: i64 = 86_400;
const BILLING_PERIOD_DAYS: i64 = 30;

/// Recorded gateway call
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    CreatePaymentIntent {
        params: PaymentIntentParams,
        test_mode: bool,
    },
    RetrievePaymentIntent(String),
    CreateCustomer(CustomerParams),
    RetrieveCustomer(String),
    CreateConnectAccount(ConnectAccountParams),
    RetrieveConnectAccount(String),
    CreateAccountLink(AccountLinkParams),
    CreateRefund(RefundParams),
    RetrieveRefund(String),
    CreateSubscription(SubscriptionParams),
    RetrieveSubscription(String),
    CancelSubscription(String),
}

#[derive(Default)]
struct MockState {
    next_id: u64,
    failure: Option<String>,
    live_mode: bool,
    calls: Vec<GatewayCall>,
    payment_intents: HashMap<String, PaymentIntent>,
    customers: HashMap<String, Customer>,
    accounts: HashMap<String, ConnectAccount>,
    refunds: HashMap<String, Refund>,
    subscriptions: HashMap<String, Subscription>,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}_mock{:04}", prefix, self.next_id)
    }

    /// Record the call, then fail if a failure is configured
    fn record(&mut self, call: GatewayCall) -> PaymentResult<()> {
        self.calls.push(call);
        match &self.failure {
            Some(message) => Err(PaymentError::ProviderError {
                provider: "mock".to_string(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn no_such(kind: &str, id: &str) -> PaymentError {
    PaymentError::ProviderError {
        provider: "mock".to_string(),
        message: format!("No such {}: '{}'", kind, id),
    }
}

/// In-process gateway for tests
#[derive(Default)]
pub struct MockGateway {
    inner: Mutex<MockState>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway holding live credentials (test payment path is refused)
    pub fn live() -> Self {
        let gateway = Self::new();
        gateway.state().live_mode = true;
        gateway
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent call fail with a provider error
    pub fn fail_with(&self, message: impl Into<String>) {
        self.state().failure = Some(message.into());
    }

    /// Stop failing
    pub fn recover(&self) {
        self.state().failure = None;
    }

    /// All calls so far, oldest first
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().calls.clone()
    }

    /// Simulate the provider moving a payment intent to a new status
    pub fn set_payment_intent_status(&self, payment_intent_id: &str, status: &str) {
        if let Some(intent) = self.state().payment_intents.get_mut(payment_intent_id) {
            intent.status = status.to_string();
        }
    }

    /// Simulate the provider moving a subscription to a new status
    pub fn set_subscription_status(&self, subscription_id: &str, status: &str) {
        if let Some(subscription) = self.state().subscriptions.get_mut(subscription_id) {
            subscription.status = status.to_string();
        }
    }

    fn payment_intent(
        &self,
        params: &PaymentIntentParams,
        test_mode: bool,
    ) -> PaymentResult<PaymentIntent> {
        let mut state = self.state();
        state.record(GatewayCall::CreatePaymentIntent {
            params: params.clone(),
            test_mode,
        })?;
        if test_mode && state.live_mode {
            return Err(PaymentError::Configuration(
                "test payment intents cannot be created with live keys".to_string(),
            ));
        }

        let id = state.next_id("pi");
        let intent = PaymentIntent {
            client_secret: Some(format!("{}_secret_mock", id)),
            id: id.clone(),
            amount: params.amount,
            currency: params.currency.clone(),
            status: if test_mode {
                "succeeded".to_string()
            } else {
                "requires_payment_method".to_string()
            },
            customer: params.customer_id.clone(),
        };
        state.payment_intents.insert(id, intent.clone());
        Ok(intent)
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_payment_intent(
        &self,
        params: &PaymentIntentParams,
    ) -> PaymentResult<PaymentIntent> {
        self.payment_intent(params, false)
    }

    async fn create_test_payment_intent(
        &self,
        params: &PaymentIntentParams,
    ) -> PaymentResult<PaymentIntent> {
        self.payment_intent(params, true)
    }

    async fn retrieve_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> PaymentResult<PaymentIntent> {
        let mut state = self.state();
        state.record(GatewayCall::RetrievePaymentIntent(payment_intent_id.to_string()))?;
        state
            .payment_intents
            .get(payment_intent_id)
            .cloned()
            .ok_or_else(|| no_such("payment_intent", payment_intent_id))
    }

    async fn create_customer(&self, params: &CustomerParams) -> PaymentResult<Customer> {
        let mut state = self.state();
        state.record(GatewayCall::CreateCustomer(params.clone()))?;
        let customer = Customer {
            id: state.next_id("cus"),
            email: Some(params.email.clone()),
            name: params.name.clone(),
            created: Utc::now().timestamp(),
        };
        state.customers.insert(customer.id.clone(), customer.clone());
        Ok(customer)
    }

    async fn retrieve_customer(&self, customer_id: &str) -> PaymentResult<Customer> {
        let mut state = self.state();
        state.record(GatewayCall::RetrieveCustomer(customer_id.to_string()))?;
        state
            .customers
            .get(customer_id)
            .cloned()
            .ok_or_else(|| no_such("customer", customer_id))
    }

    async fn create_connect_account(
        &self,
        params: &ConnectAccountParams,
    ) -> PaymentResult<ConnectAccount> {
        let mut state = self.state();
        state.record(GatewayCall::CreateConnectAccount(params.clone()))?;
        let account = ConnectAccount {
            id: state.next_id("acct"),
            business_type: None,
            country: Some(params.country.clone()),
            email: params.email.clone(),
            charges_enabled: false,
            payouts_enabled: false,
            requirements: Some(serde_json::json!({ "currently_due": ["business_type"] })),
            created: Some(Utc::now().timestamp()),
        };
        state.accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn retrieve_connect_account(&self, account_id: &str) -> PaymentResult<ConnectAccount> {
        let mut state = self.state();
        state.record(GatewayCall::RetrieveConnectAccount(account_id.to_string()))?;
        state
            .accounts
            .get(account_id)
            .cloned()
            .ok_or_else(|| no_such("account", account_id))
    }

    async fn create_account_link(&self, params: &AccountLinkParams) -> PaymentResult<AccountLink> {
        let mut state = self.state();
        state.record(GatewayCall::CreateAccountLink(params.clone()))?;
        let now = Utc::now().timestamp();
        Ok(AccountLink {
            url: format!("https://connect.stripe.com/setup/e/{}/mock", params.account_id),
            created: now,
            expires_at: now + 300,
        })
    }

    async fn create_refund(&self, params: &RefundParams) -> PaymentResult<Refund> {
        let mut state = self.state();
        state.record(GatewayCall::CreateRefund(params.clone()))?;
        let intent = state
            .payment_intents
            .get(&params.payment_intent_id)
            .cloned()
            .ok_or_else(|| no_such("payment_intent", &params.payment_intent_id))?;

        let refund = Refund {
            id: state.next_id("re"),
            payment_intent: Some(intent.id.clone()),
            amount: params.amount.unwrap_or(intent.amount),
            currency: intent.currency,
            status: "succeeded".to_string(),
            created: Utc::now().timestamp(),
        };
        state.refunds.insert(refund.id.clone(), refund.clone());
        Ok(refund)
    }

    async fn retrieve_refund(&self, refund_id: &str) -> PaymentResult<Refund> {
        let mut state = self.state();
        state.record(GatewayCall::RetrieveRefund(refund_id.to_string()))?;
        state
            .refunds
            .get(refund_id)
            .cloned()
            .ok_or_else(|| no_such("refund", refund_id))
    }

    async fn create_subscription(
        &self,
        params: &SubscriptionParams,
    ) -> PaymentResult<Subscription> {
        let mut state = self.state();
        state.record(GatewayCall::CreateSubscription(params.clone()))?;
        let now = Utc::now().timestamp();
        let trial_end = params
            .trial_period_days
            .map(|days| now + i64::from(days) * SECONDS_PER_DAY);

        let subscription = Subscription {
            id: state.next_id("sub"),
            customer: params.customer_id.clone(),
            status: if trial_end.is_some() { "trialing" } else { "active" }.to_string(),
            current_period_start: now,
            current_period_end: trial_end.unwrap_or(now + BILLING_PERIOD_DAYS * SECONDS_PER_DAY),
            trial_start: trial_end.map(|_| now),
            trial_end,
            cancel_at_period_end: false,
            canceled_at: None,
        };
        state
            .subscriptions
            .insert(subscription.id.clone(), subscription.clone());
        Ok(subscription)
    }

    async fn retrieve_subscription(&self, subscription_id: &str) -> PaymentResult<Subscription> {
        let mut state = self.state();
        state.record(GatewayCall::RetrieveSubscription(subscription_id.to_string()))?;
        state
            .subscriptions
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| no_such("subscription", subscription_id))
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> PaymentResult<Subscription> {
        let mut state = self.state();
        state.record(GatewayCall::CancelSubscription(subscription_id.to_string()))?;
        let subscription = state
            .subscriptions
            .get_mut(subscription_id)
            .ok_or_else(|| no_such("subscription", subscription_id))?;
        subscription.cancel_at_period_end = true;
        if subscription.canceled_at.is_none() {
            subscription.canceled_at = Some(Utc::now().timestamp());
        }
        Ok(subscription.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
