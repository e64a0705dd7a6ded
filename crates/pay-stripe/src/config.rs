//! # Stripe Configuration
//!
//! Configuration management for Stripe integration.
//! All secrets are loaded from environment variables.

use pay_core::PaymentError;
use std::env;

pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
pub const API_VERSION: &str = "2024-12-18.acacia";

/// Stripe API configuration
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...), empty when unset
    pub secret_key: String,

    /// Publishable key (pk_test_... or pk_live_...), empty when unset
    pub publishable_key: String,

    /// Webhook signing secret (whsec_...). Loaded but not used yet.
    pub webhook_secret: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,
}

impl StripeConfig {
    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// Env vars, all optional:
    /// - `STRIPE_SECRET_KEY`
    /// - `STRIPE_PUBLISHABLE_KEY`
    /// - `STRIPE_WEBHOOK_SECRET`
    /// - `STRIPE_API_BASE_URL`
    ///
    /// Keys that are present must carry the right prefix.
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, PaymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).unwrap_or_default();

        let config = Self {
            secret_key: var("STRIPE_SECRET_KEY"),
            publishable_key: var("STRIPE_PUBLISHABLE_KEY"),
            webhook_secret: var("STRIPE_WEBHOOK_SECRET"),
            api_base_url: lookup("STRIPE_API_BASE_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            api_version: API_VERSION.to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        secret_key: impl Into<String>,
        publishable_key: impl Into<String>,
        webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            secret_key: secret_key.into(),
            publishable_key: publishable_key.into(),
            webhook_secret: webhook_secret.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: API_VERSION.to_string(),
        }
    }

    /// Check the prefix of every key that is set
    pub fn validate(&self) -> Result<(), PaymentError> {
        check_prefix(
            "STRIPE_SECRET_KEY",
            &self.secret_key,
            &["sk_test_", "sk_live_"],
        )?;
        check_prefix(
            "STRIPE_PUBLISHABLE_KEY",
            &self.publishable_key,
            &["pk_test_", "pk_live_"],
        )?;
        check_prefix("STRIPE_WEBHOOK_SECRET", &self.webhook_secret, &["whsec_"])
    }

    /// Whether both API keys are present
    pub fn is_configured(&self) -> bool {
        !self.secret_key.is_empty() && !self.publishable_key.is_empty()
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Check if using live keys
    pub fn is_live_mode(&self) -> bool {
        self.secret_key.starts_with("sk_live_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

fn check_prefix(name: &str, value: &str, prefixes: &[&str]) -> Result<(), PaymentError> {
    if value.is_empty() || prefixes.iter().any(|p| value.starts_with(p)) {
        return Ok(());
    }
    Err(PaymentError::Configuration(format!(
        "{} must start with {}",
        name,
        prefixes.join(" or ")
    )))
}
