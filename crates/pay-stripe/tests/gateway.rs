//! StripeClient against a local wiremock server.

use pay_core::{
    PaymentError, PaymentGateway, PaymentIntentParams, RefundParams, SubscriptionParams,
};
use pay_stripe::{StripeClient, StripeConfig};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn client(server: &MockServer, secret_key: &str) -> StripeClient {
    let config = StripeConfig::new(secret_key, "pk_test_123", "").with_api_base_url(server.uri());
    StripeClient::new(config).unwrap()
}

fn intent_params(amount: i64) -> PaymentIntentParams {
    PaymentIntentParams {
        amount,
        currency: "usd".to_string(),
        customer_id: None,
        description: Some("Invoice 7".to_string()),
        metadata: None,
    }
}

#[tokio::test]
async fn creates_payment_intent_with_form_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .and(header("Authorization", "Bearer sk_test_123"))
        .and(header("Stripe-Version", "2024-12-18.acacia"))
        .and(body_string_contains("amount=2050"))
        .and(body_string_contains("automatic_payment_methods%5Benabled%5D=true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pi_123",
            "object": "payment_intent",
            "amount": 2050,
            "currency": "usd",
            "status": "requires_payment_method",
            "client_secret": "pi_123_secret_abc",
            "customer": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let intent = client(&server, "sk_test_123")
        .create_payment_intent(&intent_params(2050))
        .await
        .unwrap();

    assert_eq!(intent.id, "pi_123");
    assert_eq!(intent.client_secret.as_deref(), Some("pi_123_secret_abc"));
}

#[tokio::test]
async fn surfaces_stripe_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/payment_intents/pi_missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "type": "invalid_request_error",
                "code": "resource_missing",
                "message": "No such payment_intent: 'pi_missing'"
            }
        })))
        .mount(&server)
        .await;

    let err = client(&server, "sk_test_123")
        .retrieve_payment_intent("pi_missing")
        .await
        .unwrap_err();

    match err {
        PaymentError::ProviderError { provider, message } => {
            assert_eq!(provider, "stripe");
            assert_eq!(message, "No such payment_intent: 'pi_missing'");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn unparseable_error_body_is_not_echoed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/customers/cus_1"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = client(&server, "sk_test_123")
        .retrieve_customer("cus_1")
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("HTTP 502"));
    assert!(!message.contains("upstream exploded"));
}

#[tokio::test]
async fn full_refund_sends_no_amount() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/refunds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "re_1",
            "amount": 2050,
            "currency": "usd",
            "payment_intent": "pi_123",
            "status": "succeeded",
            "created": 1700000000
        })))
        .mount(&server)
        .await;

    let refund = client(&server, "sk_test_123")
        .create_refund(&RefundParams {
            payment_intent_id: "pi_123".to_string(),
            amount: None,
            reason: None,
        })
        .await
        .unwrap();
    assert_eq!(refund.amount, 2050);

    let requests: Vec<Request> = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).to_string();
    assert!(body.contains("payment_intent=pi_123"));
    assert!(!body.contains("amount="));
}

#[tokio::test]
async fn cancel_subscription_at_period_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/subscriptions/sub_1"))
        .and(body_string_contains("cancel_at_period_end=true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "current_period_start": 1700000000,
            "current_period_end": 1702592000,
            "trial_start": null,
            "trial_end": null,
            "cancel_at_period_end": true,
            "canceled_at": 1700000500
        })))
        .expect(1)
        .mount(&server)
        .await;

    let subscription = client(&server, "sk_test_123")
        .cancel_subscription("sub_1")
        .await
        .unwrap();
    assert!(subscription.cancel_at_period_end);
    assert_eq!(subscription.canceled_at, Some(1700000500));
}

#[tokio::test]
async fn subscription_quantity_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/subscriptions"))
        .and(body_string_contains("items%5B0%5D%5Bquantity%5D=5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sub_2",
            "customer": "cus_1",
            "status": "trialing",
            "current_period_start": 1700000000,
            "current_period_end": 1700604800,
            "trial_start": 1700000000,
            "trial_end": 1700604800,
            "cancel_at_period_end": false,
            "canceled_at": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let subscription = client(&server, "sk_test_123")
        .create_subscription(&SubscriptionParams {
            customer_id: "cus_1".to_string(),
            price_id: "price_1".to_string(),
            quantity: 5,
            trial_period_days: Some(7),
            metadata: None,
        })
        .await
        .unwrap();
    assert_eq!(subscription.status, "trialing");
}

#[tokio::test]
async fn test_payment_path_refused_for_live_keys() {
    let server = MockServer::start().await;

    let err = client(&server, "sk_live_123")
        .create_test_payment_intent(&intent_params(100))
        .await
        .unwrap_err();

    assert!(matches!(err, PaymentError::Configuration(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_secret_key_fails_before_request() {
    let server = MockServer::start().await;

    let err = client(&server, "")
        .retrieve_refund("re_1")
        .await
        .unwrap_err();

    assert!(matches!(err, PaymentError::Configuration(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}
