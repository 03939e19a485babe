//! Identifiers used throughout the nftmart engine.
//!
//! NFT instance ids and order sequence numbers are plain `u64` newtypes:
//! the hosting ledger hands out instance ids, and the engine assigns order
//! sequence numbers monotonically per collection. Accounts are sidechain
//! account names (lowercase, 3..=16 chars).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants;

// ---------------------------------------------------------------------------
// NftId
// ---------------------------------------------------------------------------

/// An NFT instance id within a collection.
///
/// Ascending `NftId` order is the stable sort order of every table scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NftId(pub u64);

impl fmt::Display for NftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NftId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// OrderSeq
// ---------------------------------------------------------------------------

/// Engine-assigned order sequence number, monotonic per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderSeq(pub u64);

impl OrderSeq {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for OrderSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// A sidechain account name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The marketplace's own custody account.
    #[must_use]
    pub fn market() -> Self {
        Self(constants::MARKET_ACCOUNT.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is a well-formed account name: lowercase
    /// alphanumeric plus `.` and `-`, 3..=16 chars.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let len = self.0.len();
        if !(constants::MIN_ACCOUNT_LEN..=constants::MAX_ACCOUNT_LEN).contains(&len) {
            return false;
        }
        self.0
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Whether `symbol` is a well-formed collection/token symbol:
/// uppercase alphanumeric, 1..=10 chars, starting with a letter.
#[must_use]
pub fn is_well_formed_symbol(symbol: &str) -> bool {
    if symbol.is_empty() || symbol.len() > constants::MAX_SYMBOL_LEN {
        return false;
    }
    let mut chars = symbol.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
