//! # Connect Service
//!
//! Seller onboarding. Nothing is stored locally; accounts live at the provider.

use crate::connect::ConnectAccountInfo;
use crate::error::PaymentResult;
use crate::gateway::{AccountLink, AccountLinkParams, BoxedPaymentGateway, ConnectAccountParams};
use tracing::{info, instrument};

pub struct ConnectService {
    gateway: BoxedPaymentGateway,
}

impl ConnectService {
    pub fn new(gateway: BoxedPaymentGateway) -> Self {
        Self { gateway }
    }

    /// Create an express account and an onboarding link that returns to `redirect_uri`
    #[instrument(skip(self))]
    pub async fn start_onboarding(&self, redirect_uri: &str) -> PaymentResult<AccountLink> {
        let account = self
            .gateway
            .create_connect_account(&ConnectAccountParams::express_us())
            .await?;

        let link = self
            .gateway
            .create_account_link(&AccountLinkParams {
                account_id: account.id.clone(),
                refresh_url: format!("{}?refresh=true", redirect_uri),
                return_url: redirect_uri.to_string(),
                link_type: "account_onboarding".to_string(),
            })
            .await?;

        info!("Started onboarding for connect account {}", account.id);
        Ok(link)
    }

    pub async fn account(&self, account_id: &str) -> PaymentResult<ConnectAccountInfo> {
        let account = self.gateway.retrieve_connect_account(account_id).await?;
        Ok(account.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{GatewayCall, MockGateway};
    use std::sync::Arc;

    const REDIRECT: &str = "http://localhost:8000/api/v1/connect/oauth/callback";

    #[tokio::test]
    async fn test_start_onboarding() {
        let gateway = Arc::new(MockGateway::new());
        let service = ConnectService::new(gateway.clone());

        let link = service.start_onboarding(REDIRECT).await.unwrap();
        assert!(link.url.starts_with("https://connect.stripe.com/"));

        let calls = gateway.calls();
        match (&calls[0], &calls[1]) {
            (GatewayCall::CreateConnectAccount(account), GatewayCall::CreateAccountLink(params)) => {
                assert_eq!(account.account_type, "express");
                assert_eq!(account.country, "US");
                assert_eq!(account.capabilities, vec!["card_payments", "transfers"]);
                assert_eq!(params.refresh_url, format!("{}?refresh=true", REDIRECT));
                assert_eq!(params.return_url, REDIRECT);
                assert_eq!(params.link_type, "account_onboarding");
            }
            other => panic!("unexpected calls: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_onboarding_failure_skips_link() {
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_with("Connect is not enabled");
        let service = ConnectService::new(gateway.clone());

        assert!(service.start_onboarding(REDIRECT).await.is_err());
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_account_lookup() {
        let gateway = Arc::new(MockGateway::new());
        let service = ConnectService::new(gateway.clone());
        service.start_onboarding(REDIRECT).await.unwrap();

        let info = service.account("acct_mock0001").await.unwrap();
        assert_eq!(info.account_id, "acct_mock0001");
        assert!(!info.charges_enabled);

        let err = service.account("acct_missing").await.unwrap_err();
        assert!(err.to_string().contains("No such account"));
    }
}
