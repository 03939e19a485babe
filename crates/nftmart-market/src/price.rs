//! Ask-price validation against the settlement token's declared precision.

use rust_decimal::Decimal;

use nftmart_types::{MarketError, Result};

/// Check that an ask price is positive and representable at the settlement
/// token's precision.
pub fn validate_ask_price(price: Decimal, precision: u32) -> Result<()> {
    if price <= Decimal::ZERO {
        return Err(MarketError::InvalidPrice {
            reason: format!("price must be positive, got {price}"),
        });
    }
    // Trailing zeros don't count against the precision.
    if price.normalize().scale() > precision {
        return Err(MarketError::InvalidPrice {
            reason: format!("price {price} exceeds token precision of {precision}"),
        });
    }
    Ok(())
}
