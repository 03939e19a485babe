//! Per-grouping market aggregates.
//!
//! Maintained alongside the order table on every insert/remove/reprice.
//! The aggregation detail is display-facing, not load-bearing for
//! settlement correctness.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate counters for one `(collection, grouping)` segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketMetrics {
    /// Canonical grouping key (`name=value,...`).
    pub grouping_key: String,
    /// Number of open orders in this segment.
    pub open_orders: u64,
    /// Lowest ask among open orders, if any.
    pub floor_price: Option<Decimal>,
    /// Symbol the floor price is denominated in.
    pub floor_symbol: Option<String>,
}

impl MarketMetrics {
    #[must_use]
    pub fn empty(grouping_key: String) -> Self {
        Self {
            grouping_key,
            open_orders: 0,
            floor_price: None,
            floor_symbol: None,
        }
    }

    /// Whether this segment has no open orders left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open_orders == 0
    }
}
