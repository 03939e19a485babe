//! Events emitted by the marketplace engine.
//!
//! Every operation returns the events it produced; the host appends them to
//! the transaction's emitted log. Downstream components reconcile against
//! these the same way this engine reconciles against the token and NFT
//! ledgers' logs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, CustodyTag, NftId, OrderSeq, SellOrder};

/// Fields shared by order creation and cancellation events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEventData {
    pub account: AccountId,
    pub custody: CustodyTag,
    pub collection: String,
    pub nft_id: NftId,
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub price_symbol: String,
    pub fee_bp: u16,
    pub order_seq: OrderSeq,
}

impl From<&SellOrder> for OrderEventData {
    fn from(order: &SellOrder) -> Self {
        Self {
            account: order.account.clone(),
            custody: order.custody,
            collection: order.collection.clone(),
            nft_id: order.nft_id,
            timestamp: order.created_at,
            price: order.price,
            price_symbol: order.price_symbol.clone(),
            fee_bp: order.fee_bp,
            order_seq: order.order_seq,
        }
    }
}

/// Per-seller line of a [`MarketEvent::SaleSettled`] aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerPayout {
    pub account: AccountId,
    pub custody: CustodyTag,
    /// Payment subtotal actually transferred to this seller.
    pub payment: Decimal,
    /// The instance ids this payout covers.
    pub nft_ids: Vec<NftId>,
}

/// Everything the marketplace emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum MarketEvent {
    /// A collection's market was enabled.
    MarketEnabled { collection: String },

    /// A sell order was created after confirmed custody lock-in.
    OrderCreated(OrderEventData),

    /// An open order's ask price changed.
    PriceChanged {
        collection: String,
        nft_id: NftId,
        old_price: Decimal,
        new_price: Decimal,
        price_symbol: String,
        order_seq: OrderSeq,
    },

    /// An order was cancelled after confirmed custody release.
    OrderCancelled(OrderEventData),

    /// Aggregate settlement record for one buy batch.
    SaleSettled {
        collection: String,
        price_symbol: String,
        sellers: Vec<SellerPayout>,
        payment_total: Decimal,
        fee_total: Decimal,
    },
}

impl MarketEvent {
    /// Stable event name, as it appears in the emitted log.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::MarketEnabled { .. } => "marketEnabled",
            Self::OrderCreated(_) => "orderCreated",
            Self::PriceChanged { .. } => "priceChanged",
            Self::OrderCancelled(_) => "orderCancelled",
            Self::SaleSettled { .. } => "saleSettled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names() {
        let ev = MarketEvent::MarketEnabled {
            collection: "FOO".to_string(),
        };
        assert_eq!(ev.name(), "marketEnabled");
    }

    #[test]
    fn order_event_data_from_order() {
        let order = SellOrder::dummy("FOO", 4, "alice", Decimal::new(100, 0));
        let data = OrderEventData::from(&order);
        assert_eq!(data.nft_id, NftId(4));
        assert_eq!(data.account, AccountId::new("alice"));
        assert_eq!(data.price, Decimal::new(100, 0));
    }

    #[test]
    fn sale_settled_serde_roundtrip() {
        let ev = MarketEvent::SaleSettled {
            collection: "FOO".to_string(),
            price_symbol: "USD".to_string(),
            sellers: vec![SellerPayout {
                account: AccountId::new("alice"),
                custody: CustodyTag::User,
                payment: Decimal::new(90, 0),
                nft_ids: vec![NftId(1)],
            }],
            payment_total: Decimal::new(90, 0),
            fee_total: Decimal::new(10, 0),
        };
        let json = serde_json::to_string(&ev).unwrap();
        let back: MarketEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }

    #[test]
    fn tagged_representation() {
        let ev = MarketEvent::MarketEnabled {
            collection: "FOO".to_string(),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "MarketEnabled");
        assert_eq!(json["data"]["collection"], "FOO");
    }
}
