//! # nftmart-ledger
//!
//! The consumed external surfaces of the marketplace engine, and the order
//! store it exclusively owns.
//!
//! ## Architecture
//!
//! Every asset movement crosses a component boundary through
//! [`ContractHost::invoke`], which is synchronous but **non-transactional**:
//! a response with no errors proves nothing per item. The only ground truth
//! is the embedded event log, which [`reconcile`] folds into an explicit
//! per-item `Confirmed | Unconfirmed` mapping.
//!
//! ## Movement flow
//!
//! ```text
//! engine → Gateway (build payload) → ContractHost::invoke
//!        → reconcile(log, expectation) → CustodyOutcome / Confirmation
//! ```
//!
//! The engine observes outcomes; it never assumes them.

pub mod gateway;
pub mod invoke;
pub mod order_store;
pub mod reconcile;

#[cfg(any(test, feature = "test-helpers"))]
pub mod harness;

pub use gateway::{NftGateway, NftTransfer, NftTransferLog, TokenGateway, TokenTransfer};
pub use invoke::{Chain, ContractCall, ContractHost, EmittedLog, InvokeResponse, LedgerReader};
pub use order_store::{CollectionTable, OrderStore, Page};
pub use reconcile::{Confirmation, CustodyOutcome};
