//! # pay-core
//!
//! Core types, the provider gateway trait and the domain services for the
//! stripe-b2b payments API.
//!
//! This crate provides:
//! - `PaymentGateway` trait for implementing payment providers
//! - `RecordStore` and `InMemoryStore` for local records
//! - `PaymentService`, `RefundService`, `SubscriptionService`,
//!   `CustomerService` and `ConnectService`
//! - `PaymentError` for typed error handling
//! - `MockGateway` (feature `mock`) for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{CreatePaymentRequest, PaymentService};
//! use rust_decimal::Decimal;
//!
//! let payments = PaymentService::new(gateway.clone());
//!
//! // 20.50 USD becomes a 2050-cent payment intent
//! let created = payments
//!     .create(CreatePaymentRequest::new(Decimal::new(2050, 2), "usd"), false)
//!     .await?;
//!
//! // Hand created.client_secret to the front end
//! ```

pub mod connect;
pub mod error;
pub mod event;
pub mod gateway;
pub mod money;
pub mod payment;
pub mod refund;
pub mod service;
pub mod store;
pub mod subscription;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-exports for convenience
pub use connect::{ConnectAccountInfo, OAuthCallbackOutcome};
pub use error::{PaymentError, PaymentResult};
pub use event::{ProviderEvent, ProviderEventType};
pub use gateway::{
    AccountLink, AccountLinkParams, BoxedPaymentGateway, ConnectAccount, ConnectAccountParams,
    Customer, CustomerParams, PaymentGateway, PaymentIntent, PaymentIntentParams, Refund,
    RefundParams, Subscription, SubscriptionParams,
};
pub use payment::{CreatePaymentRequest, CreatedPayment, PaymentRecord, PaymentStatus};
pub use refund::{CreateRefundRequest, RefundReason, RefundRecord};
pub use service::{
    ConnectService, CreateCustomerRequest, CustomerService, PaymentService, RefundService,
    SubscriptionService,
};
pub use store::{InMemoryStore, ListPage, PageRequest, Record, RecordStore, SharedStore};
pub use subscription::{CreateSubscriptionRequest, SubscriptionRecord, SubscriptionStatus};
