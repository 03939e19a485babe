//! The settlement engine: multi-seller batched `buy`.
//!
//! A buy is one funds check, one mandatory fee transfer, then one payment
//! transfer per seller group and one custody hand-off for everything sold.
//! Only the fee step is all-or-nothing; payment failures degrade to a
//! partial fill by seller group, with the untouched orders left open.

use std::collections::HashMap;

use rust_decimal::Decimal;

use nftmart_ledger::{Chain, NftGateway, NftTransfer, OrderStore, TokenGateway, TokenTransfer};
use nftmart_types::{
    AccountId, BuyRequest, ChainContext, CustodyTag, MarketError, MarketEvent, NftId, Result,
    SellOrder, SellerPayout,
};

use crate::fees::{market_fee, seller_payment};

/// Result of a `buy` invocation.
#[derive(Debug)]
pub struct BuyOutcome {
    /// Ids whose orders settled: payment confirmed (or zero), order removed.
    pub sold: Vec<NftId>,
    /// Ids whose seller group's payment was unconfirmed; orders stay open.
    pub unfilled: Vec<NftId>,
    pub events: Vec<MarketEvent>,
}

/// Payment lines aggregated per distinct `(seller, custody)` pair, in
/// first-seen order.
struct SellerGroup {
    account: AccountId,
    custody: CustodyTag,
    subtotal: Decimal,
    nft_ids: Vec<NftId>,
}

/// Settles buy batches against the order book.
pub struct SettlementEngine<'a, C: Chain> {
    store: &'a mut OrderStore,
    chain: &'a mut C,
}

impl<'a, C: Chain> SettlementEngine<'a, C> {
    pub fn new(store: &'a mut OrderStore, chain: &'a mut C) -> Self {
        Self { store, chain }
    }

    /// Buy up to 50 listed instances in one batch; the caller pays and
    /// receives custody.
    ///
    /// # Errors
    /// - `Authorization` if unsigned
    /// - `Validation` on malformed shape/bounds or a mixed-symbol batch
    /// - `SelfTrade` if any matched order belongs to the caller
    /// - `MarketNotFound` / `NotFound` for unknown market or token
    /// - `InsufficientFunds` if the caller cannot cover fee + payments;
    ///   checked before any transfer
    /// - `FeeTransferUnconfirmed` if the mandatory fee step fails
    pub fn buy(&mut self, req: &BuyRequest, ctx: &ChainContext) -> Result<BuyOutcome> {
        ctx.require_signed()?;
        req.validate()?;

        let table = self.store.table(&req.collection)?;
        let matched: Vec<SellOrder> = table
            .lookup(&req.nft_ids)
            .into_iter()
            .cloned()
            .collect();
        if matched.is_empty() {
            return Ok(BuyOutcome {
                sold: vec![],
                unfilled: vec![],
                events: vec![],
            });
        }

        let price_symbol = matched[0].price_symbol.clone();
        for order in &matched {
            if order.is_owned_by(&ctx.caller) {
                return Err(MarketError::SelfTrade(order.nft_id));
            }
            if order.price_symbol != price_symbol {
                return Err(MarketError::Validation {
                    reason: format!(
                        "batch mixes price symbols {price_symbol} and {}",
                        order.price_symbol
                    ),
                });
            }
        }

        let precision = self
            .chain
            .token_precision(&price_symbol)
            .ok_or_else(|| MarketError::NotFound {
                what: format!("token {price_symbol}"),
            })?;

        // Per-order fee split, payments aggregated per seller group.
        let mut fee_total = Decimal::ZERO;
        let mut payment_total = Decimal::ZERO;
        let mut groups: Vec<SellerGroup> = Vec::new();
        let mut group_index: HashMap<(AccountId, CustodyTag), usize> = HashMap::new();
        for order in &matched {
            let fee = market_fee(order.price, order.fee_bp, precision);
            let payment = seller_payment(order.price, fee);
            fee_total += fee;
            payment_total += payment;

            let key = (order.account.clone(), order.custody);
            let idx = *group_index.entry(key).or_insert_with(|| {
                groups.push(SellerGroup {
                    account: order.account.clone(),
                    custody: order.custody,
                    subtotal: Decimal::ZERO,
                    nft_ids: Vec::new(),
                });
                groups.len() - 1
            });
            groups[idx].subtotal += payment;
            groups[idx].nft_ids.push(order.nft_id);
        }

        // Funds check precedes the first transfer; nothing is mutated on
        // rejection.
        let needed = fee_total + payment_total;
        let available = self.chain.token_balance(&ctx.caller, &price_symbol);
        if available < needed {
            return Err(MarketError::InsufficientFunds { needed, available });
        }

        // Mandatory fee step, all-or-nothing for the batch.
        if fee_total > Decimal::ZERO {
            let transfer = TokenTransfer {
                from: ctx.caller.clone(),
                to: req.fee_recipient.clone(),
                to_kind: CustodyTag::User,
                symbol: price_symbol.clone(),
                quantity: fee_total,
            };
            let conf = TokenGateway::new(&mut *self.chain).transfer(&transfer)?;
            if !conf.is_confirmed() {
                return Err(MarketError::FeeTransferUnconfirmed {
                    symbol: price_symbol,
                    quantity: fee_total,
                });
            }
        }

        // Seller payments, one transfer per group in first-seen order. A
        // group settles iff its transfer confirmed or its subtotal is
        // exactly zero.
        let mut sold = Vec::new();
        let mut unfilled = Vec::new();
        let mut sellers = Vec::new();
        let mut paid_total = Decimal::ZERO;
        for group in groups {
            let settled = if group.subtotal == Decimal::ZERO {
                true
            } else {
                let transfer = TokenTransfer {
                    from: ctx.caller.clone(),
                    to: group.account.clone(),
                    to_kind: group.custody,
                    symbol: price_symbol.clone(),
                    quantity: group.subtotal,
                };
                TokenGateway::new(&mut *self.chain)
                    .transfer(&transfer)?
                    .is_confirmed()
            };
            if settled {
                paid_total += group.subtotal;
                sold.extend(group.nft_ids.iter().copied());
                sellers.push(SellerPayout {
                    account: group.account,
                    custody: group.custody,
                    payment: group.subtotal,
                    nft_ids: group.nft_ids,
                });
            } else {
                tracing::warn!(
                    collection = %req.collection,
                    seller = %group.account,
                    subtotal = %group.subtotal,
                    "Seller payment unconfirmed; group's orders stay open"
                );
                unfilled.extend(group.nft_ids);
            }
        }
        sold.sort_unstable();
        unfilled.sort_unstable();

        // Custody hand-off for everything sold, pool → buyer, one call.
        // The orders are removed regardless of per-id confirmation here:
        // the sale is settled once the payment moved, and an unconfirmed
        // hand-off is surfaced through the log for operators.
        if !sold.is_empty() {
            let transfer =
                NftTransfer::release(&ctx.caller, CustodyTag::User, &req.collection, sold.clone());
            let outcome = NftGateway::new(&mut *self.chain).transfer(&transfer)?;
            for id in outcome.unconfirmed_ids() {
                tracing::warn!(
                    collection = %req.collection,
                    nft_id = %id,
                    buyer = %ctx.caller,
                    "Custody hand-off unconfirmed for sold instance"
                );
            }
        }

        let table = self.store.table_mut(&req.collection)?;
        for id in &sold {
            table.remove(*id);
        }

        tracing::info!(
            collection = %req.collection,
            buyer = %ctx.caller,
            sold = sold.len(),
            unfilled = unfilled.len(),
            fee_total = %fee_total,
            payment_total = %paid_total,
            "Buy batch settled"
        );
        let events = vec![MarketEvent::SaleSettled {
            collection: req.collection.clone(),
            price_symbol,
            sellers,
            payment_total: paid_total,
            fee_total,
        }];
        Ok(BuyOutcome {
            sold,
            unfilled,
            events,
        })
    }
}
