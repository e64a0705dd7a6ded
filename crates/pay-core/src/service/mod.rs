//! Domain services. Each owns its record store and shares the gateway.

pub mod connect;
pub mod customer;
pub mod payment;
pub mod refund;
pub mod subscription;

pub use connect::ConnectService;
pub use customer::{CreateCustomerRequest, CustomerService};
pub use payment::PaymentService;
pub use refund::RefundService;
pub use subscription::SubscriptionService;
