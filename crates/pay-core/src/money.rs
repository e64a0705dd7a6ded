//! # Money
//!
//! Amounts are held locally in major currency units as `Decimal` and sent to
//! the provider in minor units (cents). The provider API is always addressed
//! with a fixed factor of 100.

use crate::error::{PaymentError, PaymentResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Currency used when a request does not name one
pub const DEFAULT_CURRENCY: &str = "usd";

/// Minor units per major unit
const MINOR_UNIT_SCALE: u32 = 2;

/// Convert a major-unit amount to minor units, rounding half away from zero.
pub fn to_minor_units(amount: Decimal) -> PaymentResult<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| PaymentError::validation(format!("amount {} is out of range", amount)))
}

/// Convert a provider minor-unit amount back to major units
pub fn from_minor_units(amount: i64) -> Decimal {
    Decimal::new(amount, MINOR_UNIT_SCALE)
}

/// Require a strictly positive amount
pub fn ensure_positive(amount: Decimal, field: &str) -> PaymentResult<()> {
    if amount <= Decimal::ZERO {
        return Err(PaymentError::validation(format!(
            "{} must be greater than 0",
            field
        )));
    }
    Ok(())
}

/// Require an amount that is still at least one minor unit after rounding
pub fn ensure_chargeable(amount: Decimal, field: &str) -> PaymentResult<()> {
    ensure_positive(amount, field)?;
    if to_minor_units(amount)? < 1 {
        return Err(PaymentError::validation(format!(
            "{} must be at least 0.01",
            field
        )));
    }
    Ok(())
}

/// Lower-case and trim a currency code; empty codes are rejected
pub fn normalize_currency(currency: &str) -> PaymentResult<String> {
    let code = currency.trim().to_lowercase();
    if code.is_empty() {
        return Err(PaymentError::validation("currency must not be empty"));
    }
    Ok(code)
}
