//! Per-invocation context supplied by the hosting ledger.
//!
//! The host serializes invocations, so no two operations race on the same
//! records. The engine never reads the wall clock in business logic; chain
//! time arrives here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, MarketError, Result};

/// The invocation context: who called, whether the call was signed with
/// sufficient privilege, and the current monotonic chain time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainContext {
    /// The calling account.
    pub caller: AccountId,
    /// Host-asserted flag: the caller signed with active authority.
    pub is_signed: bool,
    /// Monotonic chain time for this invocation.
    pub now: DateTime<Utc>,
}

impl ChainContext {
    /// Require a signed invocation. Every entry point calls this first.
    pub fn require_signed(&self) -> Result<()> {
        if self.is_signed {
            Ok(())
        } else {
            Err(MarketError::Authorization {
                reason: format!("{} did not sign with active authority", self.caller),
            })
        }
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl ChainContext {
    pub fn signed(caller: &str) -> Self {
        Self {
            caller: AccountId::new(caller),
            is_signed: true,
            now: Utc::now(),
        }
    }

    pub fn unsigned(caller: &str) -> Self {
        Self {
            caller: AccountId::new(caller),
            is_signed: false,
            now: Utc::now(),
        }
    }
}
