//! # Application State
//!
//! Shared state for the Axum application.
//! Contains configuration, the provider gateway and the domain services.

use pay_core::{
    BoxedPaymentGateway, ConnectService, CustomerService, PaymentService, RefundService,
    SubscriptionService,
};
use pay_stripe::{StripeClient, StripeConfig};
use std::net::SocketAddr;
use std::sync::Arc;

pub const DEFAULT_APP_NAME: &str = "Stripe B2B Payments API";
pub const DEFAULT_OAUTH_REDIRECT_URI: &str = "http://localhost:8000/api/v1/connect/oauth/callback";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Service name reported by `/health`
    pub app_name: String,
    /// Verbose logging
    pub debug: bool,
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Where Connect onboarding returns to
    pub oauth_redirect_uri: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup; unset or unparseable values fall back to defaults
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            app_name: lookup("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            debug: lookup("DEBUG")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(true),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(8000),
            oauth_redirect_uri: lookup("OAUTH_REDIRECT_URI")
                .unwrap_or_else(|| DEFAULT_OAUTH_REDIRECT_URI.to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Whether Stripe keys were supplied
    pub stripe_configured: bool,
    pub gateway: BoxedPaymentGateway,
    pub payments: Arc<PaymentService>,
    pub refunds: Arc<RefundService>,
    pub subscriptions: Arc<SubscriptionService>,
    pub customers: Arc<CustomerService>,
    pub connect: Arc<ConnectService>,
}

impl AppState {
    /// Create a new AppState backed by Stripe
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let stripe_config = StripeConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load Stripe config: {}", e))?;
        let stripe_configured = stripe_config.is_configured();
        if !stripe_configured {
            tracing::warn!("Stripe keys not set; provider calls will fail");
        } else if stripe_config.is_live_mode() {
            tracing::info!("Stripe running with live keys");
        }

        let client = StripeClient::new(stripe_config)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        Ok(Self::with_gateway(config, Arc::new(client), stripe_configured))
    }

    /// Wire the services around any gateway
    pub fn with_gateway(
        config: AppConfig,
        gateway: BoxedPaymentGateway,
        stripe_configured: bool,
    ) -> Self {
        Self {
            payments: Arc::new(PaymentService::new(gateway.clone())),
            refunds: Arc::new(RefundService::new(gateway.clone())),
            subscriptions: Arc::new(SubscriptionService::new(gateway.clone())),
            customers: Arc::new(CustomerService::new(gateway.clone())),
            connect: Arc::new(ConnectService::new(gateway.clone())),
            gateway,
            config,
            stripe_configured,
        }
    }
}
