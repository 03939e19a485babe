//! In-memory stand-in for the hosting ledger and its collaborator
//! contracts, used by unit and integration tests.
//!
//! Implements both [`LedgerReader`] and [`ContractHost`]. Transfers are
//! deliberately non-atomic: each item either moves and emits a log entry,
//! or silently does nothing. Tests script silent per-item failures with
//! [`MemoryChain::drop_nft_transfer`] and
//! [`MemoryChain::drop_token_credit`] to exercise the engine's
//! reconciliation paths.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use nftmart_types::{constants, AccountId, CustodyTag, Grouping, NftId};

use crate::gateway::{NftTransfer, NftTransferLog, TokenTransfer};
use crate::invoke::{ContractCall, ContractHost, EmittedLog, InvokeResponse, LedgerReader};

#[derive(Debug, Default)]
struct TokenDef {
    precision: u32,
    /// Liquid account balances.
    balances: BTreeMap<AccountId, Decimal>,
    /// In-pool balances credited by `to_kind = pool` transfers.
    pool_credits: BTreeMap<AccountId, Decimal>,
}

#[derive(Debug)]
struct NftInstance {
    holder: AccountId,
    holder_kind: CustodyTag,
    grouping: Grouping,
}

#[derive(Debug)]
struct NftCollection {
    issuer: AccountId,
    instances: BTreeMap<NftId, NftInstance>,
}

/// The in-memory chain harness.
#[derive(Debug, Default)]
pub struct MemoryChain {
    tokens: BTreeMap<String, TokenDef>,
    collections: BTreeMap<String, NftCollection>,
    /// Custody transfers of these instances silently do nothing.
    dropped_nft_transfers: BTreeSet<(String, NftId)>,
    /// Token transfers to these recipients silently do nothing.
    dropped_token_credits: BTreeSet<AccountId>,
}

impl MemoryChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =================================================================
    // Fixture setup
    // =================================================================

    pub fn define_token(&mut self, symbol: &str, precision: u32) {
        self.tokens.insert(
            symbol.to_string(),
            TokenDef {
                precision,
                ..TokenDef::default()
            },
        );
    }

    pub fn credit(&mut self, account: &str, symbol: &str, amount: Decimal) {
        if let Some(token) = self.tokens.get_mut(symbol) {
            *token
                .balances
                .entry(AccountId::new(account))
                .or_insert(Decimal::ZERO) += amount;
        }
    }

    pub fn define_collection(&mut self, collection: &str, issuer: &str) {
        self.collections.insert(
            collection.to_string(),
            NftCollection {
                issuer: AccountId::new(issuer),
                instances: BTreeMap::new(),
            },
        );
    }

    pub fn mint_nft(&mut self, collection: &str, id: u64, holder: &str, grouping: Grouping) {
        if let Some(col) = self.collections.get_mut(collection) {
            col.instances.insert(
                NftId(id),
                NftInstance {
                    holder: AccountId::new(holder),
                    holder_kind: CustodyTag::User,
                    grouping,
                },
            );
        }
    }

    /// Force an instance into pool custody (as if already locked in).
    pub fn set_custody(&mut self, collection: &str, id: u64, holder: &str, kind: CustodyTag) {
        if let Some(instance) = self
            .collections
            .get_mut(collection)
            .and_then(|c| c.instances.get_mut(&NftId(id)))
        {
            instance.holder = AccountId::new(holder);
            instance.holder_kind = kind;
        }
    }

    // =================================================================
    // Scripted silent failures
    // =================================================================

    pub fn drop_nft_transfer(&mut self, collection: &str, id: u64) {
        self.dropped_nft_transfers
            .insert((collection.to_string(), NftId(id)));
    }

    pub fn drop_token_credit(&mut self, recipient: &str) {
        self.dropped_token_credits.insert(AccountId::new(recipient));
    }

    /// Clear a scripted custody fault so a retried transfer goes through.
    pub fn restore_nft_transfer(&mut self, collection: &str, id: u64) {
        self.dropped_nft_transfers
            .remove(&(collection.to_string(), NftId(id)));
    }

    // =================================================================
    // Inspection
    // =================================================================

    #[must_use]
    pub fn balance(&self, account: &str, symbol: &str) -> Decimal {
        self.tokens
            .get(symbol)
            .and_then(|t| t.balances.get(&AccountId::new(account)))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn pool_credit(&self, account: &str, symbol: &str) -> Decimal {
        self.tokens
            .get(symbol)
            .and_then(|t| t.pool_credits.get(&AccountId::new(account)))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn nft_holder(&self, collection: &str, id: u64) -> Option<(AccountId, CustodyTag)> {
        self.collections
            .get(collection)
            .and_then(|c| c.instances.get(&NftId(id)))
            .map(|i| (i.holder.clone(), i.holder_kind))
    }

    // =================================================================
    // Contract actions
    // =================================================================

    fn nft_transfer(&mut self, payload: serde_json::Value) -> InvokeResponse {
        let mut resp = InvokeResponse::default();
        let req: NftTransfer = match serde_json::from_value(payload) {
            Ok(req) => req,
            Err(err) => {
                resp.errors.push(format!("malformed payload: {err}"));
                return resp;
            }
        };

        for id in &req.nft_ids {
            if self
                .dropped_nft_transfers
                .contains(&(req.collection.clone(), *id))
            {
                // Scripted fault: nothing happens, nothing is logged.
                continue;
            }
            let Some(instance) = self
                .collections
                .get_mut(&req.collection)
                .and_then(|c| c.instances.get_mut(id))
            else {
                resp.errors
                    .push(format!("unknown instance {}#{id}", req.collection));
                continue;
            };
            if instance.holder != req.from || instance.holder_kind != req.from_kind {
                resp.errors
                    .push(format!("instance {}#{id} not held by {}", req.collection, req.from));
                continue;
            }
            instance.holder = req.to.clone();
            instance.holder_kind = req.to_kind;
            resp.events.push(EmittedLog {
                contract: constants::NFT_CONTRACT.to_string(),
                event: NftTransfer::EVENT.to_string(),
                data: serde_json::to_value(NftTransferLog {
                    from: req.from.clone(),
                    from_kind: req.from_kind,
                    to: req.to.clone(),
                    to_kind: req.to_kind,
                    collection: req.collection.clone(),
                    nft_id: *id,
                })
                .expect("log data serializes"),
            });
        }
        resp
    }

    fn token_transfer(&mut self, payload: serde_json::Value) -> InvokeResponse {
        let mut resp = InvokeResponse::default();
        let req: TokenTransfer = match serde_json::from_value(payload) {
            Ok(req) => req,
            Err(err) => {
                resp.errors.push(format!("malformed payload: {err}"));
                return resp;
            }
        };

        if self.dropped_token_credits.contains(&req.to) {
            // Scripted fault: nothing happens, nothing is logged.
            return resp;
        }
        let Some(token) = self.tokens.get_mut(&req.symbol) else {
            resp.errors.push(format!("unknown token {}", req.symbol));
            return resp;
        };
        if req.quantity <= Decimal::ZERO {
            resp.errors
                .push(format!("non-positive quantity {}", req.quantity));
            return resp;
        }
        let from_balance = token
            .balances
            .entry(req.from.clone())
            .or_insert(Decimal::ZERO);
        if *from_balance < req.quantity {
            resp.errors.push(format!(
                "insufficient balance: {} has {from_balance} {}",
                req.from, req.symbol
            ));
            return resp;
        }
        *from_balance -= req.quantity;
        let credits = match req.to_kind {
            CustodyTag::User => &mut token.balances,
            CustodyTag::Pool => &mut token.pool_credits,
        };
        *credits.entry(req.to.clone()).or_insert(Decimal::ZERO) += req.quantity;

        resp.events.push(EmittedLog {
            contract: constants::TOKENS_CONTRACT.to_string(),
            event: TokenTransfer::EVENT.to_string(),
            data: serde_json::to_value(&req).expect("log data serializes"),
        });
        resp
    }
}

impl LedgerReader for MemoryChain {
    fn token_precision(&self, symbol: &str) -> Option<u32> {
        self.tokens.get(symbol).map(|t| t.precision)
    }

    fn token_balance(&self, account: &AccountId, symbol: &str) -> Decimal {
        self.balance(account.as_str(), symbol)
    }

    fn collection_issuer(&self, collection: &str) -> Option<AccountId> {
        self.collections.get(collection).map(|c| c.issuer.clone())
    }

    fn nft_grouping(&self, collection: &str, id: NftId) -> Option<Grouping> {
        self.collections
            .get(collection)
            .and_then(|c| c.instances.get(&id))
            .map(|i| i.grouping.clone())
    }
}

impl ContractHost for MemoryChain {
    fn invoke(&mut self, call: ContractCall) -> InvokeResponse {
        match (call.contract.as_str(), call.action.as_str()) {
            (constants::NFT_CONTRACT, constants::TRANSFER_ACTION) => {
                self.nft_transfer(call.payload)
            }
            (constants::TOKENS_CONTRACT, constants::TRANSFER_ACTION) => {
                self.token_transfer(call.payload)
            }
            (contract, action) => InvokeResponse {
                errors: vec![format!("unknown action {contract}/{action}")],
                events: vec![],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{NftGateway, TokenGateway};

    fn chain_with_nfts() -> MemoryChain {
        let mut chain = MemoryChain::new();
        chain.define_token("USD", 2);
        chain.credit("buyer", "USD", Decimal::new(1000, 0));
        chain.define_collection("FOO", "issuer");
        chain.mint_nft("FOO", 1, "alice", Grouping::new());
        chain.mint_nft("FOO", 2, "alice", Grouping::new());
        chain
    }

    #[test]
    fn custody_transfer_moves_and_logs() {
        let mut chain = chain_with_nfts();
        let transfer =
            NftTransfer::lock_in(&AccountId::new("alice"), "FOO", vec![NftId(1), NftId(2)]);
        let outcome = NftGateway::new(&mut chain).transfer(&transfer).unwrap();
        assert!(outcome.all_confirmed());
        assert_eq!(
            chain.nft_holder("FOO", 1),
            Some((AccountId::market(), CustodyTag::Pool))
        );
    }

    #[test]
    fn dropped_transfer_is_silent() {
        let mut chain = chain_with_nfts();
        chain.drop_nft_transfer("FOO", 2);
        let transfer =
            NftTransfer::lock_in(&AccountId::new("alice"), "FOO", vec![NftId(1), NftId(2)]);
        let outcome = NftGateway::new(&mut chain).transfer(&transfer).unwrap();
        assert!(outcome.is_confirmed(NftId(1)));
        assert!(!outcome.is_confirmed(NftId(2)));
        // The faulted instance is untouched.
        assert_eq!(
            chain.nft_holder("FOO", 2),
            Some((AccountId::new("alice"), CustodyTag::User))
        );
    }

    #[test]
    fn not_owner_errors_but_batch_continues() {
        let mut chain = chain_with_nfts();
        let transfer =
            NftTransfer::lock_in(&AccountId::new("mallory"), "FOO", vec![NftId(1)]);
        let outcome = NftGateway::new(&mut chain).transfer(&transfer).unwrap();
        assert!(!outcome.is_confirmed(NftId(1)));
    }

    #[test]
    fn token_transfer_debits_and_credits() {
        let mut chain = chain_with_nfts();
        let transfer = TokenTransfer {
            from: AccountId::new("buyer"),
            to: AccountId::new("seller"),
            to_kind: CustodyTag::User,
            symbol: "USD".to_string(),
            quantity: Decimal::new(100, 0),
        };
        let conf = TokenGateway::new(&mut chain).transfer(&transfer).unwrap();
        assert!(conf.is_confirmed());
        assert_eq!(chain.balance("buyer", "USD"), Decimal::new(900, 0));
        assert_eq!(chain.balance("seller", "USD"), Decimal::new(100, 0));
    }

    #[test]
    fn pool_credit_goes_to_pool_bucket() {
        let mut chain = chain_with_nfts();
        let transfer = TokenTransfer {
            from: AccountId::new("buyer"),
            to: AccountId::new("seller"),
            to_kind: CustodyTag::Pool,
            symbol: "USD".to_string(),
            quantity: Decimal::new(25, 0),
        };
        TokenGateway::new(&mut chain).transfer(&transfer).unwrap();
        assert_eq!(chain.pool_credit("seller", "USD"), Decimal::new(25, 0));
        assert_eq!(chain.balance("seller", "USD"), Decimal::ZERO);
    }

    #[test]
    fn insufficient_balance_not_confirmed() {
        let mut chain = chain_with_nfts();
        let transfer = TokenTransfer {
            from: AccountId::new("buyer"),
            to: AccountId::new("seller"),
            to_kind: CustodyTag::User,
            symbol: "USD".to_string(),
            quantity: Decimal::new(5000, 0),
        };
        let conf = TokenGateway::new(&mut chain).transfer(&transfer).unwrap();
        assert!(!conf.is_confirmed());
        assert_eq!(chain.balance("buyer", "USD"), Decimal::new(1000, 0));
    }

    #[test]
    fn dropped_token_credit_is_silent_and_keeps_funds() {
        let mut chain = chain_with_nfts();
        chain.drop_token_credit("seller");
        let transfer = TokenTransfer {
            from: AccountId::new("buyer"),
            to: AccountId::new("seller"),
            to_kind: CustodyTag::User,
            symbol: "USD".to_string(),
            quantity: Decimal::new(100, 0),
        };
        let conf = TokenGateway::new(&mut chain).transfer(&transfer).unwrap();
        assert!(!conf.is_confirmed());
        assert_eq!(chain.balance("buyer", "USD"), Decimal::new(1000, 0));
        assert_eq!(chain.balance("seller", "USD"), Decimal::ZERO);
    }

    #[test]
    fn reader_queries() {
        let chain = chain_with_nfts();
        assert_eq!(chain.token_precision("USD"), Some(2));
        assert_eq!(chain.token_precision("XYZ"), None);
        assert_eq!(
            chain.collection_issuer("FOO"),
            Some(AccountId::new("issuer"))
        );
        assert!(chain.nft_grouping("FOO", NftId(1)).is_some());
        assert!(chain.nft_grouping("FOO", NftId(99)).is_none());
    }
}
