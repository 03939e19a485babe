//! Sell-order model for the marketplace order book.
//!
//! A [`SellOrder`] exists **iff** the corresponding NFT instance is custodied
//! by the marketplace pool. Orders are created only after a confirmed custody
//! lock-in, and destroyed only on cancel (custody returns to the owner) or on
//! a confirmed sale (custody moves to the buyer).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, NftId, OrderSeq};

/// Who beneficially holds the proceeds side of an order.
///
/// `User` orders pay out to the seller's account balance; `Pool` orders
/// credit the seller's in-pool balance instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustodyTag {
    User,
    Pool,
}

impl std::fmt::Display for CustodyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Pool => write!(f, "pool"),
        }
    }
}

/// Grouping attributes: a derived subset of an NFT's properties used to
/// segment orders of the same collection for display and metrics.
pub type Grouping = BTreeMap<String, String>;

/// An open fixed-price sell order.
///
/// At most one open order exists per `(collection, nft_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellOrder {
    /// Engine-assigned sequence number, monotonic per collection.
    pub order_seq: OrderSeq,
    /// Collection symbol this order trades in.
    pub collection: String,
    /// The listed NFT instance.
    pub nft_id: NftId,
    /// The seller.
    pub account: AccountId,
    /// Proceeds destination kind for the seller.
    pub custody: CustodyTag,
    /// Derived grouping attributes (name → stringified value).
    pub grouping: Grouping,
    /// Ask price, positive, at settlement-token precision.
    pub price: Decimal,
    /// Settlement-token symbol the price is denominated in.
    pub price_symbol: String,
    /// Market fee in basis points, 0..=10000.
    pub fee_bp: u16,
    /// Monotonic chain time at creation.
    pub created_at: DateTime<Utc>,
}

impl SellOrder {
    /// Whether `account` owns this order.
    #[must_use]
    pub fn is_owned_by(&self, account: &AccountId) -> bool {
        self.account == *account
    }

    /// The key this order's metrics are aggregated under.
    #[must_use]
    pub fn grouping_key(&self) -> String {
        grouping_key(&self.grouping)
    }
}

impl std::fmt::Display for SellOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}#{} by {} @ {} {}",
            self.order_seq, self.collection, self.nft_id, self.account, self.price,
            self.price_symbol,
        )
    }
}

/// Canonical string key for a grouping (`name=value` pairs joined by `,`,
/// in BTreeMap key order so the key is deterministic).
#[must_use]
pub fn grouping_key(grouping: &Grouping) -> String {
    grouping
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl SellOrder {
    pub fn dummy(collection: &str, nft_id: u64, account: &str, price: Decimal) -> Self {
        Self {
            order_seq: OrderSeq(0),
            collection: collection.to_string(),
            nft_id: NftId(nft_id),
            account: AccountId::new(account),
            custody: CustodyTag::User,
            grouping: Grouping::new(),
            price,
            price_symbol: "USD".to_string(),
            fee_bp: 0,
            created_at: Utc::now(),
        }
    }
}
