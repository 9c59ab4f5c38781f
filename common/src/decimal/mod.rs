//! Decimal type utilities for precise financial calculations

use rust_decimal::{Decimal, RoundingStrategy};
pub use rust_decimal_macros::dec;

/// Price type with high precision
pub type Price = Decimal;

/// Quantity type with high precision
pub type Quantity = Decimal;

/// Amount type with high precision (typically Price * Quantity)
pub type Amount = Decimal;

/// Scale applied to every stored balance, price and quantity
pub const SCALE: u32 = 2;

/// Round a value to the ledger scale, half away from zero
///
/// Every amount is normalized before it is compared or stored so that all
/// arithmetic happens at one fixed scale.
pub fn normalize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}
