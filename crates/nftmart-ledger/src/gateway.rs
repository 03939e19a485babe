//! Typed gateways over the token and NFT ledger contracts.
//!
//! A gateway builds the action payload, performs the invoke, and folds the
//! returned log into a typed outcome. Call sites never see raw events.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use nftmart_types::{constants, AccountId, CustodyTag, NftId, Result};

use crate::invoke::{ContractCall, ContractHost};
use crate::reconcile::{reconcile_custody, reconcile_token, Confirmation, CustodyOutcome};

// ---------------------------------------------------------------------------
// NFT custody transfers
// ---------------------------------------------------------------------------

/// A batched NFT custody transfer request — also the expected per-item
/// event signature, minus the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftTransfer {
    pub from: AccountId,
    pub from_kind: CustodyTag,
    pub to: AccountId,
    pub to_kind: CustodyTag,
    pub collection: String,
    pub nft_ids: Vec<NftId>,
}

impl NftTransfer {
    pub const EVENT: &'static str = "transfer";

    #[must_use]
    pub fn contract(&self) -> String {
        constants::NFT_CONTRACT.to_string()
    }

    /// Custody lock-in: caller's user custody → marketplace pool.
    #[must_use]
    pub fn lock_in(caller: &AccountId, collection: &str, nft_ids: Vec<NftId>) -> Self {
        Self {
            from: caller.clone(),
            from_kind: CustodyTag::User,
            to: AccountId::market(),
            to_kind: CustodyTag::Pool,
            collection: collection.to_string(),
            nft_ids,
        }
    }

    /// Custody release: marketplace pool → `to` with the given kind
    /// (roles reversed from lock-in).
    #[must_use]
    pub fn release(to: &AccountId, to_kind: CustodyTag, collection: &str, nft_ids: Vec<NftId>) -> Self {
        Self {
            from: AccountId::market(),
            from_kind: CustodyTag::Pool,
            to: to.clone(),
            to_kind,
            collection: collection.to_string(),
            nft_ids,
        }
    }
}

/// One per-instance entry of the NFT ledger's emitted transfer log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftTransferLog {
    pub from: AccountId,
    pub from_kind: CustodyTag,
    pub to: AccountId,
    pub to_kind: CustodyTag,
    pub collection: String,
    pub nft_id: NftId,
}

/// Gateway to the NFT ownership ledger.
pub struct NftGateway<'a> {
    host: &'a mut dyn ContractHost,
}

impl<'a> NftGateway<'a> {
    pub fn new(host: &'a mut dyn ContractHost) -> Self {
        Self { host }
    }

    /// Request a batched custody transfer and reconcile the per-item
    /// outcome from the emitted log.
    pub fn transfer(&mut self, transfer: &NftTransfer) -> Result<CustodyOutcome> {
        let call = ContractCall {
            contract: transfer.contract(),
            action: constants::TRANSFER_ACTION.to_string(),
            payload: serde_json::to_value(transfer)?,
        };
        let resp = self.host.invoke(call);
        let outcome = reconcile_custody(&resp, transfer);
        tracing::debug!(
            collection = %transfer.collection,
            requested = transfer.nft_ids.len(),
            confirmed = outcome.confirmed_ids().len(),
            "Custody transfer reconciled"
        );
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// Fungible-token transfers
// ---------------------------------------------------------------------------

/// A fungible-token transfer request — also the exact expected event
/// signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransfer {
    pub from: AccountId,
    pub to: AccountId,
    /// `User` credits the recipient's account balance, `Pool` their
    /// in-pool balance.
    pub to_kind: CustodyTag,
    pub symbol: String,
    pub quantity: Decimal,
}

impl TokenTransfer {
    pub const EVENT: &'static str = "transfer";

    #[must_use]
    pub fn contract(&self) -> String {
        constants::TOKENS_CONTRACT.to_string()
    }
}

/// Gateway to the fungible-token ledger.
pub struct TokenGateway<'a> {
    host: &'a mut dyn ContractHost,
}

impl<'a> TokenGateway<'a> {
    pub fn new(host: &'a mut dyn ContractHost) -> Self {
        Self { host }
    }

    /// Request a token transfer and reconcile its single confirmation
    /// from the emitted log.
    pub fn transfer(&mut self, transfer: &TokenTransfer) -> Result<Confirmation> {
        let call = ContractCall {
            contract: transfer.contract(),
            action: constants::TRANSFER_ACTION.to_string(),
            payload: serde_json::to_value(transfer)?,
        };
        let resp = self.host.invoke(call);
        let conf = reconcile_token(&resp, transfer);
        tracing::debug!(
            symbol = %transfer.symbol,
            quantity = %transfer.quantity,
            confirmed = conf.is_confirmed(),
            "Token transfer reconciled"
        );
        Ok(conf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::InvokeResponse;

    /// A host that echoes every requested movement back as confirmed.
    struct EchoHost;

    impl ContractHost for EchoHost {
        fn invoke(&mut self, call: ContractCall) -> InvokeResponse {
            let mut events = Vec::new();
            if call.contract == constants::NFT_CONTRACT {
                let req: NftTransfer = serde_json::from_value(call.payload).unwrap();
                for id in &req.nft_ids {
                    events.push(crate::invoke::EmittedLog {
                        contract: call.contract.clone(),
                        event: NftTransfer::EVENT.to_string(),
                        data: serde_json::to_value(NftTransferLog {
                            from: req.from.clone(),
                            from_kind: req.from_kind,
                            to: req.to.clone(),
                            to_kind: req.to_kind,
                            collection: req.collection.clone(),
                            nft_id: *id,
                        })
                        .unwrap(),
                    });
                }
            } else {
                events.push(crate::invoke::EmittedLog {
                    contract: call.contract.clone(),
                    event: TokenTransfer::EVENT.to_string(),
                    data: call.payload,
                });
            }
            InvokeResponse {
                errors: vec![],
                events,
            }
        }
    }

    #[test]
    fn nft_gateway_confirms_echoed_batch() {
        let mut host = EchoHost;
        let transfer =
            NftTransfer::lock_in(&AccountId::new("alice"), "FOO", vec![NftId(1), NftId(2)]);
        let outcome = NftGateway::new(&mut host).transfer(&transfer).unwrap();
        assert!(outcome.all_confirmed());
    }

    #[test]
    fn token_gateway_confirms_echoed_transfer() {
        let mut host = EchoHost;
        let transfer = TokenTransfer {
            from: AccountId::new("buyer"),
            to: AccountId::new("seller"),
            to_kind: CustodyTag::User,
            symbol: "USD".to_string(),
            quantity: Decimal::new(42, 0),
        };
        let conf = TokenGateway::new(&mut host).transfer(&transfer).unwrap();
        assert!(conf.is_confirmed());
    }

    #[test]
    fn lock_in_and_release_reverse_roles() {
        let caller = AccountId::new("alice");
        let lock = NftTransfer::lock_in(&caller, "FOO", vec![NftId(1)]);
        assert_eq!(lock.from_kind, CustodyTag::User);
        assert_eq!(lock.to, AccountId::market());
        assert_eq!(lock.to_kind, CustodyTag::Pool);

        let release = NftTransfer::release(&caller, CustodyTag::User, "FOO", vec![NftId(1)]);
        assert_eq!(release.from, AccountId::market());
        assert_eq!(release.from_kind, CustodyTag::Pool);
        assert_eq!(release.to, caller);
    }
}
