//! Event-log reconciliation: did a requested movement actually happen?
//!
//! For every asset movement the engine scans the returned log for an entry
//! whose component, event name and data match the expected transfer
//! signature **exactly**. Absence means that sub-step did not happen and is
//! handled as silent partial failure, never as an exception.
//!
//! Outcomes are an explicit per-item mapping to [`Confirmation`] rather
//! than a raw event list, so call sites express "only confirmed ids
//! proceed" directly.

use std::collections::BTreeMap;

use nftmart_types::NftId;

use crate::gateway::{NftTransfer, NftTransferLog, TokenTransfer};
use crate::invoke::InvokeResponse;

/// The tagged outcome of one requested movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// A log entry matching the expected signature was found.
    Confirmed,
    /// No matching log entry; the movement must be treated as not done.
    Unconfirmed,
}

impl Confirmation {
    #[must_use]
    pub fn is_confirmed(self) -> bool {
        self == Self::Confirmed
    }
}

/// Per-instance outcome of a batched custody transfer.
#[derive(Debug, Clone)]
pub struct CustodyOutcome {
    per_id: BTreeMap<NftId, Confirmation>,
}

impl CustodyOutcome {
    #[must_use]
    pub fn is_confirmed(&self, id: NftId) -> bool {
        self.per_id
            .get(&id)
            .copied()
            .unwrap_or(Confirmation::Unconfirmed)
            .is_confirmed()
    }

    /// Confirmed ids in ascending instance-id order.
    #[must_use]
    pub fn confirmed_ids(&self) -> Vec<NftId> {
        self.per_id
            .iter()
            .filter(|(_, c)| c.is_confirmed())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Unconfirmed ids in ascending instance-id order.
    #[must_use]
    pub fn unconfirmed_ids(&self) -> Vec<NftId> {
        self.per_id
            .iter()
            .filter(|(_, c)| !c.is_confirmed())
            .map(|(id, _)| *id)
            .collect()
    }

    #[must_use]
    pub fn all_confirmed(&self) -> bool {
        self.per_id.values().all(|c| c.is_confirmed())
    }
}

/// Reconcile a batched NFT custody transfer against the emitted log.
///
/// Every requested id starts `Unconfirmed`; a log entry flips it to
/// `Confirmed` only when the from/to parties, both custody kinds and the
/// collection all match the request.
#[must_use]
pub fn reconcile_custody(resp: &InvokeResponse, expected: &NftTransfer) -> CustodyOutcome {
    let mut per_id: BTreeMap<NftId, Confirmation> = expected
        .nft_ids
        .iter()
        .map(|id| (*id, Confirmation::Unconfirmed))
        .collect();

    for log in resp.logs(&expected.contract(), NftTransfer::EVENT) {
        let Ok(entry) = serde_json::from_value::<NftTransferLog>(log.data.clone()) else {
            continue;
        };
        if entry.from == expected.from
            && entry.from_kind == expected.from_kind
            && entry.to == expected.to
            && entry.to_kind == expected.to_kind
            && entry.collection == expected.collection
        {
            if let Some(slot) = per_id.get_mut(&entry.nft_id) {
                *slot = Confirmation::Confirmed;
            }
        }
    }

    CustodyOutcome { per_id }
}

/// Reconcile a fungible-token transfer against the emitted log.
#[must_use]
pub fn reconcile_token(resp: &InvokeResponse, expected: &TokenTransfer) -> Confirmation {
    let found = resp
        .logs(&expected.contract(), TokenTransfer::EVENT)
        .any(|log| {
            serde_json::from_value::<TokenTransfer>(log.data.clone())
                .is_ok_and(|entry| entry == *expected)
        });
    if found {
        Confirmation::Confirmed
    } else {
        Confirmation::Unconfirmed
    }
}
