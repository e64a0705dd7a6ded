//! # Stripe Client
//!
//! `PaymentGateway` over the Stripe REST API. Requests are form-encoded,
//! responses are deserialised straight into the `pay_core` provider objects.

use crate::config::StripeConfig;
use crate::types::StripeErrorResponse;
use async_trait::async_trait;
use pay_core::{
    AccountLink, AccountLinkParams, ConnectAccount, ConnectAccountParams, Customer,
    CustomerParams, PaymentError, PaymentGateway, PaymentIntent, PaymentIntentParams,
    PaymentResult, Refund, RefundParams, Subscription, SubscriptionParams,
};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

const PROVIDER: &str = "stripe";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Test card used on the auto-confirm path
pub const TEST_PAYMENT_METHOD: &str = "pm_card_visa";
pub const TEST_RETURN_URL: &str = "https://example.com/return";

type Form = Vec<(String, String)>;

/// Stripe gateway
pub struct StripeClient {
    config: StripeConfig,
    client: Client,
}

impl StripeClient {
    /// Create a new Stripe client
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// `{api_base_url}/v1/{segments...}`, each segment percent-encoded
    fn url(&self, segments: &[&str]) -> PaymentResult<Url> {
        let mut url = Url::parse(&self.config.api_base_url).map_err(|e| {
            PaymentError::Configuration(format!("Invalid Stripe API base URL: {}", e))
        })?;
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                PaymentError::Configuration("Stripe API base URL cannot be a base".to_string())
            })?;
            path.pop_if_empty().push("v1").extend(segments);
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> PaymentResult<RequestBuilder> {
        if self.config.secret_key.is_empty() {
            return Err(PaymentError::Configuration(
                "STRIPE_SECRET_KEY not set".to_string(),
            ));
        }
        Ok(request
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version))
    }

    async fn post_form<T: DeserializeOwned>(&self, segments: &[&str], form: &Form) -> PaymentResult<T> {
        let url = self.url(segments)?;
        debug!("POST {} ({} form fields)", url.path(), form.len());
        let request = self.authorized(self.client.post(url))?.form(form);
        self.send(request).await
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> PaymentResult<T> {
        let url = self.url(segments)?;
        debug!("GET {}", url.path());
        let request = self.authorized(self.client.get(url))?;
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> PaymentResult<T> {
        let response = request.send().await.map_err(network_error)?;

        let status = response.status();
        let body = response.text().await.map_err(network_error)?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);
            return Err(provider_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

fn network_error(e: reqwest::Error) -> PaymentError {
    if e.is_timeout() {
        PaymentError::NetworkError(format!("Stripe request timed out: {}", e))
    } else {
        PaymentError::NetworkError(e.to_string())
    }
}

/// Stripe's own message when the body carries one; the raw body is never surfaced
pub fn provider_error(status: u16, body: &str) -> PaymentError {
    let message = serde_json::from_str::<StripeErrorResponse>(body)
        .ok()
        .and_then(|r| r.error.message)
        .unwrap_or_else(|| format!("HTTP {}", status));

    PaymentError::ProviderError {
        provider: PROVIDER.to_string(),
        message,
    }
}

// =============================================================================
// Form builders
// =============================================================================

fn push_metadata(form: &mut Form, metadata: Option<&HashMap<String, String>>) {
    if let Some(metadata) = metadata {
        // Sorted so the encoded body is stable
        let sorted: BTreeMap<_, _> = metadata.iter().collect();
        for (key, value) in sorted {
            form.push((format!("metadata[{}]", key), value.clone()));
        }
    }
}

fn push_opt(form: &mut Form, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        form.push((key.to_string(), value.to_string()));
    }
}

pub fn payment_intent_form(params: &PaymentIntentParams, test_mode: bool) -> Form {
    let mut form = vec![
        ("amount".to_string(), params.amount.to_string()),
        ("currency".to_string(), params.currency.clone()),
        (
            "automatic_payment_methods[enabled]".to_string(),
            "true".to_string(),
        ),
    ];
    push_opt(&mut form, "customer", params.customer_id.as_deref());
    push_opt(&mut form, "description", params.description.as_deref());
    push_metadata(&mut form, params.metadata.as_ref());

    if test_mode {
        form.push(("confirm".to_string(), "true".to_string()));
        form.push(("payment_method".to_string(), TEST_PAYMENT_METHOD.to_string()));
        form.push(("return_url".to_string(), TEST_RETURN_URL.to_string()));
    }
    form
}

pub fn customer_form(params: &CustomerParams) -> Form {
    let mut form = vec![("email".to_string(), params.email.clone())];
    push_opt(&mut form, "name", params.name.as_deref());
    push_metadata(&mut form, params.metadata.as_ref());
    form
}

pub fn connect_account_form(params: &ConnectAccountParams) -> Form {
    let mut form = vec![
        ("type".to_string(), params.account_type.clone()),
        ("country".to_string(), params.country.clone()),
    ];
    push_opt(&mut form, "email", params.email.as_deref());
    for capability in &params.capabilities {
        form.push((
            format!("capabilities[{}][requested]", capability),
            "true".to_string(),
        ));
    }
    form
}

pub fn account_link_form(params: &AccountLinkParams) -> Form {
    vec![
        ("account".to_string(), params.account_id.clone()),
        ("refresh_url".to_string(), params.refresh_url.clone()),
        ("return_url".to_string(), params.return_url.clone()),
        ("type".to_string(), params.link_type.clone()),
    ]
}

pub fn refund_form(params: &RefundParams) -> Form {
    let mut form = vec![(
        "payment_intent".to_string(),
        params.payment_intent_id.clone(),
    )];
    if let Some(amount) = params.amount {
        form.push(("amount".to_string(), amount.to_string()));
    }
    push_opt(&mut form, "reason", params.reason.map(|r| r.as_str()));
    form
}

pub fn subscription_form(params: &SubscriptionParams) -> Form {
    let mut form = vec![
        ("customer".to_string(), params.customer_id.clone()),
        ("items[0][price]".to_string(), params.price_id.clone()),
        ("items[0][quantity]".to_string(), params.quantity.to_string()),
    ];
    if let Some(days) = params.trial_period_days {
        form.push(("trial_period_days".to_string(), days.to_string()));
    }
    push_metadata(&mut form, params.metadata.as_ref());
    form
}

#[async_trait]
impl PaymentGateway for StripeClient {
    #[instrument(skip(self, params), fields(amount = params.amount, currency = %params.currency))]
    async fn create_payment_intent(
        &self,
        params: &PaymentIntentParams,
    ) -> PaymentResult<PaymentIntent> {
        let intent: PaymentIntent = self
            .post_form(&["payment_intents"], &payment_intent_form(params, false))
            .await?;
        info!("Created Stripe payment intent: id={}", intent.id);
        Ok(intent)
    }

    #[instrument(skip(self, params), fields(amount = params.amount))]
    async fn create_test_payment_intent(
        &self,
        params: &PaymentIntentParams,
    ) -> PaymentResult<PaymentIntent> {
        if self.config.is_live_mode() {
            return Err(PaymentError::Configuration(
                "test payment intents cannot be created with live keys".to_string(),
            ));
        }
        warn!(
            "Auto-confirming payment intent with test card {}",
            TEST_PAYMENT_METHOD
        );
        let intent: PaymentIntent = self
            .post_form(&["payment_intents"], &payment_intent_form(params, true))
            .await?;
        info!(
            "Created Stripe test payment intent: id={}, status={}",
            intent.id, intent.status
        );
        Ok(intent)
    }

    #[instrument(skip(self))]
    async fn retrieve_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> PaymentResult<PaymentIntent> {
        self.get(&["payment_intents", payment_intent_id]).await
    }

    #[instrument(skip(self, params))]
    async fn create_customer(&self, params: &CustomerParams) -> PaymentResult<Customer> {
        let customer: Customer = self.post_form(&["customers"], &customer_form(params)).await?;
        info!("Created Stripe customer: id={}", customer.id);
        Ok(customer)
    }

    #[instrument(skip(self))]
    async fn retrieve_customer(&self, customer_id: &str) -> PaymentResult<Customer> {
        self.get(&["customers", customer_id]).await
    }

    #[instrument(skip(self, params), fields(country = %params.country))]
    async fn create_connect_account(
        &self,
        params: &ConnectAccountParams,
    ) -> PaymentResult<ConnectAccount> {
        let account: ConnectAccount = self
            .post_form(&["accounts"], &connect_account_form(params))
            .await?;
        info!("Created Stripe connect account: id={}", account.id);
        Ok(account)
    }

    #[instrument(skip(self))]
    async fn retrieve_connect_account(&self, account_id: &str) -> PaymentResult<ConnectAccount> {
        self.get(&["accounts", account_id]).await
    }

    #[instrument(skip(self, params), fields(account_id = %params.account_id))]
    async fn create_account_link(&self, params: &AccountLinkParams) -> PaymentResult<AccountLink> {
        self.post_form(&["account_links"], &account_link_form(params))
            .await
    }

    #[instrument(skip(self, params), fields(payment_intent_id = %params.payment_intent_id))]
    async fn create_refund(&self, params: &RefundParams) -> PaymentResult<Refund> {
        let refund: Refund = self.post_form(&["refunds"], &refund_form(params)).await?;
        info!(
            "Created Stripe refund: id={}, amount={}",
            refund.id, refund.amount
        );
        Ok(refund)
    }

    #[instrument(skip(self))]
    async fn retrieve_refund(&self, refund_id: &str) -> PaymentResult<Refund> {
        self.get(&["refunds", refund_id]).await
    }

    #[instrument(skip(self, params), fields(customer_id = %params.customer_id))]
    async fn create_subscription(
        &self,
        params: &SubscriptionParams,
    ) -> PaymentResult<Subscription> {
        let subscription: Subscription = self
            .post_form(&["subscriptions"], &subscription_form(params))
            .await?;
        info!(
            "Created Stripe subscription: id={}, status={}",
            subscription.id, subscription.status
        );
        Ok(subscription)
    }

    #[instrument(skip(self))]
    async fn retrieve_subscription(&self, subscription_id: &str) -> PaymentResult<Subscription> {
        self.get(&["subscriptions", subscription_id]).await
    }

    #[instrument(skip(self))]
    async fn cancel_subscription(&self, subscription_id: &str) -> PaymentResult<Subscription> {
        let form = vec![("cancel_at_period_end".to_string(), "true".to_string())];
        let subscription: Subscription = self
            .post_form(&["subscriptions", subscription_id], &form)
            .await?;
        info!("Stripe subscription {} set to cancel at period end", subscription.id);
        Ok(subscription)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
