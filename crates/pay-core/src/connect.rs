//! # Connect Types
//!
//! Seller onboarding through Stripe Connect: the account view returned to
//! clients and the interpretation of the OAuth callback query.

use crate::gateway::ConnectAccount;
use serde::Serialize;
use std::collections::HashMap;

/// Public view of a connect account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectAccountInfo {
    pub account_id: String,
    pub business_type: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub requirements: Option<serde_json::Value>,
    /// Epoch seconds
    pub created: Option<i64>,
}

impl From<ConnectAccount> for ConnectAccountInfo {
    fn from(account: ConnectAccount) -> Self {
        Self {
            account_id: account.id,
            business_type: account.business_type,
            country: account.country,
            email: account.email,
            charges_enabled: account.charges_enabled,
            payouts_enabled: account.payouts_enabled,
            requirements: account.requirements,
            created: account.created,
        }
    }
}

/// What the OAuth callback query tells us
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OAuthCallbackOutcome {
    pub message: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl OAuthCallbackOutcome {
    fn new(message: &str, status: &str) -> Self {
        Self {
            message: message.to_string(),
            status: status.to_string(),
            account_id: None,
            error: None,
            error_description: None,
        }
    }

    /// Interpret callback query parameters.
    ///
    /// Precedence: `refresh=true`, then `code`, then `error`.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        if params.get("refresh").map(String::as_str) == Some("true") {
            return Self::new("OAuth refresh completed", "success");
        }

        if let Some(code) = params.get("code") {
            // The code stands in for the account id until the token exchange exists
            return Self {
                account_id: Some(code.clone()),
                ..Self::new("OAuth completed successfully", "success")
            };
        }

        if let Some(error) = params.get("error") {
            return Self {
                error: Some(error.clone()),
                error_description: params.get("error_description").cloned(),
                ..Self::new("OAuth failed", "error")
            };
        }

        Self::new("OAuth callback received", "unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_refresh_takes_precedence() {
        let outcome = OAuthCallbackOutcome::from_params(&params(&[
            ("refresh", "true"),
            ("code", "ac_123"),
        ]));
        assert_eq!(outcome.message, "OAuth refresh completed");
        assert_eq!(outcome.account_id, None);
    }

    #[test]
    fn test_code_completes() {
        let outcome = OAuthCallbackOutcome::from_params(&params(&[("code", "ac_123")]));
        assert_eq!(outcome.status, "success");
        assert_eq!(outcome.account_id.as_deref(), Some("ac_123"));
    }

    #[test]
    fn test_error_reported() {
        let outcome = OAuthCallbackOutcome::from_params(&params(&[
            ("error", "access_denied"),
            ("error_description", "The user denied your request"),
        ]));
        assert_eq!(outcome.status, "error");
        assert_eq!(outcome.error.as_deref(), Some("access_denied"));
        assert_eq!(
            outcome.error_description.as_deref(),
            Some("The user denied your request")
        );
    }

    #[test]
    fn test_empty_query_is_unknown() {
        let outcome = OAuthCallbackOutcome::from_params(&HashMap::new());
        assert_eq!(outcome.status, "unknown");
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("account_id").is_none());
    }

    #[test]
    fn test_account_info_from_provider() {
        let info = ConnectAccountInfo::from(ConnectAccount {
            id: "acct_1".into(),
            business_type: Some("company".into()),
            country: Some("US".into()),
            email: None,
            charges_enabled: true,
            payouts_enabled: false,
            requirements: None,
            created: Some(1_700_000_000),
        });
        assert_eq!(info.account_id, "acct_1");
        assert!(info.charges_enabled);
    }
}
