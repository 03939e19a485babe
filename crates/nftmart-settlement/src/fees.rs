//! Market-fee arithmetic.
//!
//! Fees are computed per order at the settlement token's precision and
//! clamped defensively: a fee can never exceed the price, and a payment
//! can never go negative. The clamps are silent, never raised as errors.

use rust_decimal::{Decimal, RoundingStrategy};

use nftmart_types::constants;

/// Market fee for one order: `price × fee_bp / 10000`, rounded half away
/// from zero at the token precision, clamped to `0..=price`.
#[must_use]
pub fn market_fee(price: Decimal, fee_bp: u16, precision: u32) -> Decimal {
    let raw = price * Decimal::from(fee_bp) / Decimal::from(constants::BP_DENOMINATOR);
    raw.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
        .clamp(Decimal::ZERO, price)
}

/// Seller payment for one order: `price − fee`, floored at zero.
#[must_use]
pub fn seller_payment(price: Decimal, fee: Decimal) -> Decimal {
    (price - fee).max(Decimal::ZERO)
}
