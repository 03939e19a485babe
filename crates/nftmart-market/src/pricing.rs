//! The price/cancel manager: batched `changePrice` and `cancel` over the
//! caller's open orders.
//!
//! `changePrice` is all-or-nothing: the whole call is rejected unless every
//! matched order belongs to the caller and shares one price symbol.
//! `cancel` reconciles the custody release per id, so a retried cancel is
//! idempotent: already-removed ids are no-ops, unconfirmed ids keep their
//! open order.

use std::collections::BTreeMap;

use nftmart_ledger::{Chain, NftGateway, NftTransfer, OrderStore};
use nftmart_types::{
    CancelRequest, ChainContext, ChangePriceRequest, CustodyTag, MarketError, MarketEvent, NftId,
    OrderEventData, OrderSeq, Result, SellOrder,
};

use crate::price::validate_ask_price;

/// Result of a `changePrice` invocation.
#[derive(Debug)]
pub struct PriceChangeOutcome {
    /// Ids whose orders were repriced, ascending.
    pub changed: Vec<NftId>,
    pub events: Vec<MarketEvent>,
}

/// Result of a `cancel` invocation.
#[derive(Debug)]
pub struct CancelOutcome {
    /// Orders removed after confirmed custody release.
    pub cancelled: Vec<SellOrder>,
    /// Ids whose release was unconfirmed; their orders stay open.
    pub retained: Vec<NftId>,
    pub events: Vec<MarketEvent>,
}

/// Mutates or removes the caller's open orders.
pub struct PriceCancelManager<'a, C: Chain> {
    store: &'a mut OrderStore,
    chain: &'a mut C,
}

impl<'a, C: Chain> PriceCancelManager<'a, C> {
    pub fn new(store: &'a mut OrderStore, chain: &'a mut C) -> Self {
        Self { store, chain }
    }

    /// Reprice a batch of the caller's open orders uniformly.
    ///
    /// # Errors
    /// - `Authorization` if unsigned, if any matched order belongs to
    ///   someone else, or if the matched batch mixes price symbols
    /// - `InvalidPrice` on non-positive or over-precision input
    pub fn change_price(
        &mut self,
        req: &ChangePriceRequest,
        ctx: &ChainContext,
    ) -> Result<PriceChangeOutcome> {
        ctx.require_signed()?;
        req.validate()?;

        let table = self.store.table(&req.collection)?;
        let matched = table.lookup(&req.nft_ids);
        if matched.is_empty() {
            return Ok(PriceChangeOutcome {
                changed: vec![],
                events: vec![],
            });
        }

        Self::require_uniform_batch(&matched, ctx)?;
        let price_symbol = matched[0].price_symbol.clone();

        let precision = self
            .chain
            .token_precision(&price_symbol)
            .ok_or_else(|| MarketError::NotFound {
                what: format!("token {price_symbol}"),
            })?;
        validate_ask_price(req.new_price, precision)?;

        let targets: Vec<(NftId, OrderSeq)> =
            matched.iter().map(|o| (o.nft_id, o.order_seq)).collect();

        let table = self.store.table_mut(&req.collection)?;
        let mut changed = Vec::new();
        let mut events = Vec::new();
        for (nft_id, order_seq) in targets {
            if let Some(old_price) = table.reprice(nft_id, req.new_price) {
                events.push(MarketEvent::PriceChanged {
                    collection: req.collection.clone(),
                    nft_id,
                    old_price,
                    new_price: req.new_price,
                    price_symbol: price_symbol.clone(),
                    order_seq,
                });
                changed.push(nft_id);
            }
        }

        tracing::debug!(
            collection = %req.collection,
            changed = changed.len(),
            new_price = %req.new_price,
            "Price change applied"
        );
        Ok(PriceChangeOutcome { changed, events })
    }

    /// Cancel a batch of the caller's open orders, returning custody.
    ///
    /// # Errors
    /// - `Authorization` if unsigned or any matched order belongs to
    ///   someone else
    pub fn cancel(&mut self, req: &CancelRequest, ctx: &ChainContext) -> Result<CancelOutcome> {
        ctx.require_signed()?;
        req.validate()?;

        let table = self.store.table(&req.collection)?;
        let matched = table.lookup(&req.nft_ids);
        if matched.is_empty() {
            // Already-removed ids are no-ops: retrying a cancel is safe.
            return Ok(CancelOutcome {
                cancelled: vec![],
                retained: vec![],
                events: vec![],
            });
        }

        for order in &matched {
            if !order.is_owned_by(&ctx.caller) {
                return Err(MarketError::Authorization {
                    reason: format!(
                        "order for instance {} belongs to {}, not {}",
                        order.nft_id, order.account, ctx.caller
                    ),
                });
            }
        }

        // Custody release, roles reversed from listing: market(pool) →
        // caller, one call per destination custody kind.
        let mut by_kind: BTreeMap<CustodyTag, Vec<NftId>> = BTreeMap::new();
        for order in &matched {
            by_kind.entry(order.custody).or_default().push(order.nft_id);
        }

        let mut confirmed = Vec::new();
        let mut retained = Vec::new();
        for (kind, ids) in by_kind {
            let transfer = NftTransfer::release(&ctx.caller, kind, &req.collection, ids);
            let outcome = NftGateway::new(&mut *self.chain).transfer(&transfer)?;
            confirmed.extend(outcome.confirmed_ids());
            retained.extend(outcome.unconfirmed_ids());
        }
        confirmed.sort_unstable();
        retained.sort_unstable();

        for id in &retained {
            tracing::warn!(
                collection = %req.collection,
                nft_id = %id,
                "Custody release unconfirmed; order retained"
            );
        }

        let table = self.store.table_mut(&req.collection)?;
        let mut cancelled = Vec::new();
        let mut events = Vec::new();
        for id in confirmed {
            if let Some(order) = table.remove(id) {
                events.push(MarketEvent::OrderCancelled(OrderEventData::from(&order)));
                cancelled.push(order);
            }
        }

        Ok(CancelOutcome {
            cancelled,
            retained,
            events,
        })
    }

    /// The cross-order consistency constraint: one owner (the caller) and
    /// one price symbol across the whole matched batch.
    fn require_uniform_batch(matched: &[&SellOrder], ctx: &ChainContext) -> Result<()> {
        let symbol = &matched[0].price_symbol;
        for order in matched {
            if !order.is_owned_by(&ctx.caller) {
                return Err(MarketError::Authorization {
                    reason: format!(
                        "order for instance {} belongs to {}, not {}",
                        order.nft_id, order.account, ctx.caller
                    ),
                });
            }
            if order.price_symbol != *symbol {
                return Err(MarketError::Authorization {
                    reason: format!(
                        "batch mixes price symbols {symbol} and {}",
                        order.price_symbol
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use nftmart_ledger::harness::MemoryChain;
    use nftmart_types::{AccountId, CollectionMarketConfig, Grouping, SellRequest};
    use rust_decimal::Decimal;

    use crate::listing::ListingManager;

    use super::*;

    /// Store + chain with three of alice's instances listed at 100 USD.
    fn setup() -> (OrderStore, MemoryChain) {
        let mut chain = MemoryChain::new();
        chain.define_token("USD", 2);
        chain.define_collection("FOO", "issuer");
        for id in 1..=3 {
            chain.mint_nft("FOO", id, "alice", Grouping::new());
        }
        let mut store = OrderStore::new();
        store
            .enable(CollectionMarketConfig {
                collection: "FOO".to_string(),
                issuer: AccountId::new("issuer"),
                enabled_at: Utc::now(),
            })
            .unwrap();
        ListingManager::new(&mut store, &mut chain)
            .sell(
                &SellRequest {
                    collection: "FOO".to_string(),
                    nft_ids: vec![NftId(1), NftId(2), NftId(3)],
                    price: Decimal::new(100, 0),
                    price_symbol: "USD".to_string(),
                    fee_bp: 0,
                },
                &ChainContext::signed("alice"),
            )
            .unwrap();
        (store, chain)
    }

    fn price_req(ids: &[u64], price: i64) -> ChangePriceRequest {
        ChangePriceRequest {
            collection: "FOO".to_string(),
            nft_ids: ids.iter().copied().map(NftId).collect(),
            new_price: Decimal::new(price, 0),
        }
    }

    fn cancel_req(ids: &[u64]) -> CancelRequest {
        CancelRequest {
            collection: "FOO".to_string(),
            nft_ids: ids.iter().copied().map(NftId).collect(),
        }
    }

    #[test]
    fn change_price_applies_uniformly() {
        let (mut store, mut chain) = setup();
        let outcome = PriceCancelManager::new(&mut store, &mut chain)
            .change_price(&price_req(&[1, 2], 80), &ChainContext::signed("alice"))
            .unwrap();

        assert_eq!(outcome.changed, vec![NftId(1), NftId(2)]);
        assert_eq!(outcome.events.len(), 2);
        let table = store.table("FOO").unwrap();
        assert_eq!(table.get(NftId(1)).unwrap().price, Decimal::new(80, 0));
        assert_eq!(table.get(NftId(3)).unwrap().price, Decimal::new(100, 0));

        match &outcome.events[0] {
            MarketEvent::PriceChanged {
                old_price,
                new_price,
                ..
            } => {
                assert_eq!(*old_price, Decimal::new(100, 0));
                assert_eq!(*new_price, Decimal::new(80, 0));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn change_price_rejects_foreign_order() {
        let (mut store, mut chain) = setup();
        let err = PriceCancelManager::new(&mut store, &mut chain)
            .change_price(&price_req(&[1, 2], 80), &ChainContext::signed("bob"))
            .unwrap_err();
        assert!(matches!(err, MarketError::Authorization { .. }));
        // Nothing mutated.
        let table = store.table("FOO").unwrap();
        assert_eq!(table.get(NftId(1)).unwrap().price, Decimal::new(100, 0));
    }

    #[test]
    fn change_price_rejects_mixed_symbols() {
        let (mut store, mut chain) = setup();
        chain.define_token("EUR", 2);
        chain.mint_nft("FOO", 4, "alice", Grouping::new());
        ListingManager::new(&mut store, &mut chain)
            .sell(
                &SellRequest {
                    collection: "FOO".to_string(),
                    nft_ids: vec![NftId(4)],
                    price: Decimal::new(50, 0),
                    price_symbol: "EUR".to_string(),
                    fee_bp: 0,
                },
                &ChainContext::signed("alice"),
            )
            .unwrap();

        let err = PriceCancelManager::new(&mut store, &mut chain)
            .change_price(&price_req(&[1, 4], 80), &ChainContext::signed("alice"))
            .unwrap_err();
        assert!(matches!(err, MarketError::Authorization { .. }));
        let table = store.table("FOO").unwrap();
        assert_eq!(table.get(NftId(1)).unwrap().price, Decimal::new(100, 0));
        assert_eq!(table.get(NftId(4)).unwrap().price, Decimal::new(50, 0));
    }

    #[test]
    fn change_price_rejects_invalid_price() {
        let (mut store, mut chain) = setup();
        let err = PriceCancelManager::new(&mut store, &mut chain)
            .change_price(&price_req(&[1], 0), &ChainContext::signed("alice"))
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidPrice { .. }));
    }

    #[test]
    fn change_price_empty_match_is_noop() {
        let (mut store, mut chain) = setup();
        let outcome = PriceCancelManager::new(&mut store, &mut chain)
            .change_price(&price_req(&[9], 80), &ChainContext::signed("alice"))
            .unwrap();
        assert!(outcome.changed.is_empty());
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn cancel_returns_custody_and_removes_orders() {
        let (mut store, mut chain) = setup();
        let outcome = PriceCancelManager::new(&mut store, &mut chain)
            .cancel(&cancel_req(&[1, 2]), &ChainContext::signed("alice"))
            .unwrap();

        assert_eq!(outcome.cancelled.len(), 2);
        assert!(outcome.retained.is_empty());
        assert_eq!(outcome.events.len(), 2);

        let table = store.table("FOO").unwrap();
        assert!(!table.contains(NftId(1)));
        assert!(table.contains(NftId(3)));
        assert_eq!(
            chain.nft_holder("FOO", 1),
            Some((AccountId::new("alice"), CustodyTag::User))
        );
    }

    #[test]
    fn cancel_rejects_foreign_order() {
        let (mut store, mut chain) = setup();
        let err = PriceCancelManager::new(&mut store, &mut chain)
            .cancel(&cancel_req(&[1]), &ChainContext::signed("bob"))
            .unwrap_err();
        assert!(matches!(err, MarketError::Authorization { .. }));
        assert!(store.table("FOO").unwrap().contains(NftId(1)));
    }

    #[test]
    fn unconfirmed_release_retains_order() {
        let (mut store, mut chain) = setup();
        chain.drop_nft_transfer("FOO", 2);
        let outcome = PriceCancelManager::new(&mut store, &mut chain)
            .cancel(&cancel_req(&[1, 2]), &ChainContext::signed("alice"))
            .unwrap();

        assert_eq!(outcome.cancelled.len(), 1);
        assert_eq!(outcome.retained, vec![NftId(2)]);
        let table = store.table("FOO").unwrap();
        assert!(table.contains(NftId(2)));

        // Retry after the fault clears: the already-removed id is a no-op,
        // the retained one goes through.
        chain.restore_nft_transfer("FOO", 2);
        let outcome = PriceCancelManager::new(&mut store, &mut chain)
            .cancel(&cancel_req(&[1, 2]), &ChainContext::signed("alice"))
            .unwrap();
        assert_eq!(outcome.cancelled.len(), 1);
        assert_eq!(outcome.cancelled[0].nft_id, NftId(2));
        assert!(outcome.retained.is_empty());
        assert!(!store.table("FOO").unwrap().contains(NftId(2)));
        assert_eq!(
            chain.nft_holder("FOO", 2),
            Some((AccountId::new("alice"), CustodyTag::User))
        );
    }

    #[test]
    fn sell_then_cancel_round_trip() {
        let (mut store, mut chain) = setup();
        PriceCancelManager::new(&mut store, &mut chain)
            .cancel(&cancel_req(&[1, 2, 3]), &ChainContext::signed("alice"))
            .unwrap();

        let table = store.table("FOO").unwrap();
        assert!(table.is_empty());
        for id in 1..=3 {
            assert_eq!(
                chain.nft_holder("FOO", id),
                Some((AccountId::new("alice"), CustodyTag::User))
            );
        }
    }
}
