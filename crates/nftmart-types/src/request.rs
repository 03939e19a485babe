//! Typed request payloads, one per marketplace action.
//!
//! Each request validates its shape and bounds exhaustively **before** any
//! mutation; price-vs-precision checks happen later, once the settlement
//! token is resolved. Validation here covers everything that can be judged
//! from the payload alone.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    constants, ids::is_well_formed_symbol, AccountId, MarketError, NftId, Result,
};

fn check_symbol(symbol: &str, what: &str) -> Result<()> {
    if is_well_formed_symbol(symbol) {
        Ok(())
    } else {
        Err(MarketError::Validation {
            reason: format!("malformed {what} symbol: {symbol:?}"),
        })
    }
}

/// Validate an id batch: non-empty, at most 50, all distinct.
fn check_batch(nft_ids: &[NftId]) -> Result<()> {
    if nft_ids.is_empty() {
        return Err(MarketError::Validation {
            reason: "empty instance id batch".to_string(),
        });
    }
    if nft_ids.len() > constants::MAX_BATCH_IDS {
        return Err(MarketError::Validation {
            reason: format!(
                "batch of {} ids exceeds the cap of {}",
                nft_ids.len(),
                constants::MAX_BATCH_IDS
            ),
        });
    }
    let distinct: BTreeSet<&NftId> = nft_ids.iter().collect();
    if distinct.len() != nft_ids.len() {
        return Err(MarketError::Validation {
            reason: "duplicate instance ids in batch".to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// enableMarket
// ---------------------------------------------------------------------------

/// Request to enable a collection's market (issuer only, one-time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnableMarketRequest {
    pub collection: String,
}

impl EnableMarketRequest {
    pub fn validate(&self) -> Result<()> {
        check_symbol(&self.collection, "collection")
    }
}

// ---------------------------------------------------------------------------
// sell
// ---------------------------------------------------------------------------

/// Request to list up to 50 owned instances at a uniform price and fee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellRequest {
    pub collection: String,
    pub nft_ids: Vec<NftId>,
    pub price: Decimal,
    pub price_symbol: String,
    /// Market fee in basis points, 0..=10000.
    pub fee_bp: u16,
}

impl SellRequest {
    pub fn validate(&self) -> Result<()> {
        check_symbol(&self.collection, "collection")?;
        check_symbol(&self.price_symbol, "price")?;
        check_batch(&self.nft_ids)?;
        if self.fee_bp > constants::MAX_FEE_BP {
            return Err(MarketError::Validation {
                reason: format!(
                    "fee of {} bp exceeds the maximum of {}",
                    self.fee_bp,
                    constants::MAX_FEE_BP
                ),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// changePrice
// ---------------------------------------------------------------------------

/// Request to reprice a batch of the caller's open orders uniformly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePriceRequest {
    pub collection: String,
    pub nft_ids: Vec<NftId>,
    pub new_price: Decimal,
}

impl ChangePriceRequest {
    pub fn validate(&self) -> Result<()> {
        check_symbol(&self.collection, "collection")?;
        check_batch(&self.nft_ids)
    }
}

// ---------------------------------------------------------------------------
// cancel
// ---------------------------------------------------------------------------

/// Request to cancel a batch of the caller's open orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    pub collection: String,
    pub nft_ids: Vec<NftId>,
}

impl CancelRequest {
    pub fn validate(&self) -> Result<()> {
        check_symbol(&self.collection, "collection")?;
        check_batch(&self.nft_ids)
    }
}

// ---------------------------------------------------------------------------
// buy
// ---------------------------------------------------------------------------

/// Request to buy a batch of listed instances; caller is the buyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyRequest {
    pub collection: String,
    pub nft_ids: Vec<NftId>,
    /// Where the market fee goes.
    pub fee_recipient: AccountId,
}

impl BuyRequest {
    pub fn validate(&self) -> Result<()> {
        check_symbol(&self.collection, "collection")?;
        check_batch(&self.nft_ids)?;
        if !self.fee_recipient.is_well_formed() {
            return Err(MarketError::Validation {
                reason: format!("malformed fee recipient account: {}", self.fee_recipient),
            });
        }
        Ok(())
    }
}
