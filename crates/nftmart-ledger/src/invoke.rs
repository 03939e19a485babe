//! The cross-contract invocation surface and collaborator query interface.
//!
//! The hosting ledger serializes invocations, so `invoke` is synchronous
//! from the engine's viewpoint. It is **not** atomic: the returned
//! [`InvokeResponse`] can carry an empty `errors` list while its event log
//! shows that only some of the requested items moved. Callers must
//! reconcile the log (see [`crate::reconcile`]) instead of trusting the
//! return value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use nftmart_types::{AccountId, Grouping, NftId};

/// One cross-component call: target contract, action, opaque payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractCall {
    pub contract: String,
    pub action: String,
    pub payload: serde_json::Value,
}

/// One entry of the emitted log returned by a cross-component call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmittedLog {
    /// The component that emitted the event.
    pub contract: String,
    /// Event name (e.g. `transfer`).
    pub event: String,
    /// Event payload; shape depends on the emitting component.
    pub data: serde_json::Value,
}

/// The result of a cross-component call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvokeResponse {
    /// Per-item error strings. May be empty even when items failed.
    pub errors: Vec<String>,
    /// The emitted event log — the only per-item ground truth.
    pub events: Vec<EmittedLog>,
}

impl InvokeResponse {
    /// Iterate the log entries emitted by `contract` for `event`.
    pub fn logs(&self, contract: &str, event: &str) -> impl Iterator<Item = &EmittedLog> {
        self.events
            .iter()
            .filter(move |log| log.contract == contract && log.event == event)
    }
}

/// The hosting ledger's cross-contract invocation interface.
pub trait ContractHost {
    fn invoke(&mut self, call: ContractCall) -> InvokeResponse;
}

/// Read-only point lookups into collaborator contract tables.
pub trait LedgerReader {
    /// Declared decimal precision of a fungible token, if it exists.
    fn token_precision(&self, symbol: &str) -> Option<u32>;

    /// Current liquid balance of `account` in `symbol` (zero if absent).
    fn token_balance(&self, account: &AccountId, symbol: &str) -> Decimal;

    /// Registered issuer of an NFT collection, if it exists.
    fn collection_issuer(&self, collection: &str) -> Option<AccountId>;

    /// Derived grouping attributes of an instance, if it exists.
    fn nft_grouping(&self, collection: &str, id: NftId) -> Option<Grouping>;
}

/// Everything the engine needs from the host, behind one borrow.
pub trait Chain: LedgerReader + ContractHost {}

impl<T: LedgerReader + ContractHost + ?Sized> Chain for T {}
