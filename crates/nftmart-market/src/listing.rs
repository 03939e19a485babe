//! The listing manager: batched `sell`.
//!
//! Custody transfer and order creation are two independent steps chained
//! only through the emitted log. An id becomes an order **only** when its
//! lock-in confirmation is found; unconfirmed ids are skipped silently —
//! no order, no error for that id alone.

use nftmart_ledger::{Chain, NftGateway, NftTransfer, OrderStore};
use nftmart_types::{
    ChainContext, CustodyTag, MarketError, MarketEvent, NftId, OrderEventData, Result, SellOrder,
    SellRequest,
};

use crate::price::validate_ask_price;

/// Result of a `sell` invocation.
#[derive(Debug)]
pub struct SellOutcome {
    /// Orders created for confirmed lock-ins, ascending by instance id.
    pub created: Vec<SellOrder>,
    /// Ids whose custody lock-in was not confirmed; left untouched.
    pub skipped: Vec<NftId>,
    pub events: Vec<MarketEvent>,
}

/// Creates sell orders after confirming custody lock-in per item.
pub struct ListingManager<'a, C: Chain> {
    store: &'a mut OrderStore,
    chain: &'a mut C,
}

impl<'a, C: Chain> ListingManager<'a, C> {
    pub fn new(store: &'a mut OrderStore, chain: &'a mut C) -> Self {
        Self { store, chain }
    }

    /// List up to 50 owned instances at a uniform price, symbol and fee.
    ///
    /// # Errors
    /// - `Authorization` if unsigned
    /// - `Validation` on malformed shape/bounds
    /// - `MarketNotFound` if the collection's market is not enabled
    /// - `NotFound` for an unknown settlement token
    /// - `InvalidPrice` on non-positive or over-precision price
    pub fn sell(&mut self, req: &SellRequest, ctx: &ChainContext) -> Result<SellOutcome> {
        ctx.require_signed()?;
        req.validate()?;

        // All checks precede the first mutating sub-call.
        self.store.table(&req.collection)?;
        let precision = self
            .chain
            .token_precision(&req.price_symbol)
            .ok_or_else(|| MarketError::NotFound {
                what: format!("token {}", req.price_symbol),
            })?;
        validate_ask_price(req.price, precision)?;

        // Custody lock-in: caller(user) → marketplace(pool). The response's
        // event log is the only per-item ground truth.
        let transfer = NftTransfer::lock_in(&ctx.caller, &req.collection, req.nft_ids.clone());
        let outcome = NftGateway::new(&mut *self.chain).transfer(&transfer)?;

        let skipped = outcome.unconfirmed_ids();
        for id in &skipped {
            tracing::warn!(
                collection = %req.collection,
                nft_id = %id,
                seller = %ctx.caller,
                "Custody lock-in unconfirmed; id skipped"
            );
        }

        let mut created = Vec::new();
        let mut events = Vec::new();
        for id in outcome.confirmed_ids() {
            let grouping = self
                .chain
                .nft_grouping(&req.collection, id)
                .unwrap_or_default();
            let table = self.store.table_mut(&req.collection)?;
            let order = SellOrder {
                order_seq: table.assign_seq(),
                collection: req.collection.clone(),
                nft_id: id,
                account: ctx.caller.clone(),
                custody: CustodyTag::User,
                grouping,
                price: req.price,
                price_symbol: req.price_symbol.clone(),
                fee_bp: req.fee_bp,
                created_at: ctx.now,
            };
            match table.insert(order.clone()) {
                Ok(()) => {
                    events.push(MarketEvent::OrderCreated(OrderEventData::from(&order)));
                    created.push(order);
                }
                Err(MarketError::DuplicateOrder(_)) => {
                    // An open order implies pool custody, so a fresh user
                    // lock-in cannot normally confirm for it. Skip rather
                    // than abort mid-batch.
                    tracing::warn!(
                        collection = %req.collection,
                        nft_id = %id,
                        "Open order already exists for confirmed lock-in; id skipped"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        tracing::debug!(
            collection = %req.collection,
            created = created.len(),
            skipped = skipped.len(),
            "Sell batch processed"
        );
        Ok(SellOutcome {
            created,
            skipped,
            events,
        })
    }
}
