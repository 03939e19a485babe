//! Per-collection market configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Existence record for a collection's market.
///
/// Created once at enablement by the collection issuer; immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMarketConfig {
    /// The collection symbol this market serves.
    pub collection: String,
    /// The issuer who enabled the market.
    pub issuer: AccountId,
    /// Chain time at enablement.
    pub enabled_at: DateTime<Utc>,
}
