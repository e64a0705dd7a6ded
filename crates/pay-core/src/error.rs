//! # Payment Error Types
//!
//! Typed error handling for the payments façade.
//! All gateway, store and service operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request data failed validation
    #[error("Invalid request: {0}")]
    Validation(String),

    /// No local record with this id
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Local payment record carries no provider payment intent
    #[error("Payment {payment_id} has no Stripe Payment Intent ID")]
    MissingProviderReference { payment_id: String },

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Shorthand for a missing local record
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        PaymentError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        PaymentError::Validation(message.into())
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Validation(_) => 400,
            PaymentError::MissingProviderReference { .. } => 400,
            PaymentError::NotFound { .. } => 404,
            PaymentError::Configuration(_)
            | PaymentError::ProviderError { .. }
            | PaymentError::NetworkError(_)
            | PaymentError::Serialization(_)
            | PaymentError::Internal(_) => 500,
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(PaymentError::validation("bad amount").status_code(), 400);
        assert_eq!(PaymentError::not_found("Payment", "abc").status_code(), 404);
        assert_eq!(
            PaymentError::MissingProviderReference {
                payment_id: "abc".into()
            }
            .status_code(),
            400
        );
        assert_eq!(
            PaymentError::ProviderError {
                provider: "stripe".into(),
                message: "card declined".into()
            }
            .status_code(),
            500
        );
        assert_eq!(PaymentError::NetworkError("timeout".into()).status_code(), 500);
    }

    #[test]
    fn test_not_found_message() {
        let err = PaymentError::not_found("Subscription", "sub-1");
        assert_eq!(err.to_string(), "Subscription not found: sub-1");
    }
}
