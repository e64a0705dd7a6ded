//! # Customer Service
//!
//! Thin pass-through to the provider's customer objects.

use crate::error::{PaymentError, PaymentResult};
use crate::gateway::{BoxedPaymentGateway, Customer, CustomerParams};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomerRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl CreateCustomerRequest {
    pub fn validate(&self) -> PaymentResult<()> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(PaymentError::validation("email must be a valid address"));
        }
        Ok(())
    }
}

pub struct CustomerService {
    gateway: BoxedPaymentGateway,
}

impl CustomerService {
    pub fn new(gateway: BoxedPaymentGateway) -> Self {
        Self { gateway }
    }

    pub async fn create(&self, request: CreateCustomerRequest) -> PaymentResult<Customer> {
        request.validate()?;
        let customer = self
            .gateway
            .create_customer(&CustomerParams {
                email: request.email.trim().to_string(),
                name: request.name,
                metadata: request.metadata,
            })
            .await?;
        info!("Created customer {}", customer.id);
        Ok(customer)
    }

    pub async fn get(&self, customer_id: &str) -> PaymentResult<Customer> {
        self.gateway.retrieve_customer(customer_id).await
    }
}
