//! The per-collection table of open sell orders, owned exclusively by the
//! marketplace.
//!
//! Each enabled collection gets one [`CollectionTable`]: a `BTreeMap` keyed
//! by instance id (stable ascending iteration, the table's declared sort
//! order), the per-grouping metrics table, and the monotonic order-sequence
//! counter. Set-membership lookups are bounded to the batch cap; scans are
//! paginated.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use nftmart_types::{
    constants, AccountId, CollectionMarketConfig, CustodyTag, MarketError, MarketMetrics, NftId,
    OrderSeq, Result, SellOrder,
};

/// Pagination window for table scans.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: constants::MAX_BATCH_IDS,
        }
    }
}

/// All marketplace tables, keyed by collection symbol.
#[derive(Debug, Default)]
pub struct OrderStore {
    collections: BTreeMap<String, CollectionTable>,
}

impl OrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a market has been enabled for `collection`.
    #[must_use]
    pub fn is_enabled(&self, collection: &str) -> bool {
        self.collections.contains_key(collection)
    }

    /// Create the order and metrics tables for a collection.
    ///
    /// # Errors
    /// Returns [`MarketError::AlreadyEnabled`] if the table exists.
    pub fn enable(&mut self, config: CollectionMarketConfig) -> Result<()> {
        if self.is_enabled(&config.collection) {
            return Err(MarketError::AlreadyEnabled(config.collection));
        }
        let collection = config.collection.clone();
        self.collections
            .insert(collection, CollectionTable::new(config));
        Ok(())
    }

    /// Shared access to a collection's table.
    ///
    /// # Errors
    /// Returns [`MarketError::MarketNotFound`] if the market was never
    /// enabled.
    pub fn table(&self, collection: &str) -> Result<&CollectionTable> {
        self.collections
            .get(collection)
            .ok_or_else(|| MarketError::MarketNotFound(collection.to_string()))
    }

    /// Mutable access to a collection's table.
    pub fn table_mut(&mut self, collection: &str) -> Result<&mut CollectionTable> {
        self.collections
            .get_mut(collection)
            .ok_or_else(|| MarketError::MarketNotFound(collection.to_string()))
    }
}

/// One collection's open orders, metrics and sequence counter.
#[derive(Debug)]
pub struct CollectionTable {
    config: CollectionMarketConfig,
    orders: BTreeMap<NftId, SellOrder>,
    metrics: BTreeMap<String, MarketMetrics>,
    next_seq: u64,
}

impl CollectionTable {
    fn new(config: CollectionMarketConfig) -> Self {
        Self {
            config,
            orders: BTreeMap::new(),
            metrics: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// The immutable enablement record.
    #[must_use]
    pub fn config(&self) -> &CollectionMarketConfig {
        &self.config
    }

    /// Assign the next order sequence number.
    pub fn assign_seq(&mut self) -> OrderSeq {
        self.next_seq += 1;
        OrderSeq(self.next_seq)
    }

    // =================================================================
    // Point and set lookups
    // =================================================================

    #[must_use]
    pub fn get(&self, id: NftId) -> Option<&SellOrder> {
        self.orders.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: NftId) -> bool {
        self.orders.contains_key(&id)
    }

    /// The open orders among `ids`, ascending by instance id, capped at the
    /// batch limit. Ids without an open order are simply absent.
    #[must_use]
    pub fn lookup(&self, ids: &[NftId]) -> Vec<&SellOrder> {
        let mut requested: Vec<NftId> = ids.to_vec();
        requested.sort_unstable();
        requested.dedup();
        requested
            .into_iter()
            .filter_map(|id| self.orders.get(&id))
            .take(constants::MAX_BATCH_IDS)
            .collect()
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    // =================================================================
    // Mutation
    // =================================================================

    /// Insert a new open order.
    ///
    /// # Errors
    /// Returns [`MarketError::DuplicateOrder`] if an open order already
    /// exists for the instance — at most one open order per
    /// `(collection, nft_id)`.
    pub fn insert(&mut self, order: SellOrder) -> Result<()> {
        if self.orders.contains_key(&order.nft_id) {
            return Err(MarketError::DuplicateOrder(order.nft_id));
        }
        let key = order.grouping_key();
        self.orders.insert(order.nft_id, order);
        self.refresh_metrics(&key);
        Ok(())
    }

    /// Remove an open order, returning it. `None` for unknown ids.
    pub fn remove(&mut self, id: NftId) -> Option<SellOrder> {
        let order = self.orders.remove(&id)?;
        self.refresh_metrics(&order.grouping_key());
        Some(order)
    }

    /// Change the ask price of an open order, returning the old price.
    /// `None` for unknown ids.
    pub fn reprice(&mut self, id: NftId, new_price: Decimal) -> Option<Decimal> {
        let order = self.orders.get_mut(&id)?;
        let old = order.price;
        order.price = new_price;
        let key = order.grouping_key();
        self.refresh_metrics(&key);
        Some(old)
    }

    // =================================================================
    // Indexed scans (ascending instance id, paginated)
    // =================================================================

    #[must_use]
    pub fn by_account(&self, account: &AccountId, page: Page) -> Vec<&SellOrder> {
        self.scan(page, |o| o.account == *account)
    }

    #[must_use]
    pub fn by_custody(&self, custody: CustodyTag, page: Page) -> Vec<&SellOrder> {
        self.scan(page, |o| o.custody == custody)
    }

    #[must_use]
    pub fn by_price_symbol(&self, symbol: &str, page: Page) -> Vec<&SellOrder> {
        self.scan(page, |o| o.price_symbol == symbol)
    }

    #[must_use]
    pub fn by_grouping(&self, grouping_key: &str, page: Page) -> Vec<&SellOrder> {
        self.scan(page, |o| o.grouping_key() == grouping_key)
    }

    fn scan<'a>(
        &'a self,
        page: Page,
        pred: impl Fn(&&'a SellOrder) -> bool,
    ) -> Vec<&'a SellOrder> {
        self.orders
            .values()
            .filter(pred)
            .skip(page.offset)
            .take(page.limit)
            .collect()
    }

    // =================================================================
    // Metrics
    // =================================================================

    #[must_use]
    pub fn metrics(&self, grouping_key: &str) -> Option<&MarketMetrics> {
        self.metrics.get(grouping_key)
    }

    /// Recompute one grouping's aggregates from the open orders. Empty
    /// segments are dropped from the metrics table.
    fn refresh_metrics(&mut self, grouping_key: &str) {
        let mut open = 0u64;
        let mut floor: Option<&SellOrder> = None;
        for order in self
            .orders
            .values()
            .filter(|o| o.grouping_key() == grouping_key)
        {
            open += 1;
            if floor.is_none_or(|f| order.price < f.price) {
                floor = Some(order);
            }
        }
        if open == 0 {
            self.metrics.remove(grouping_key);
        } else {
            self.metrics.insert(
                grouping_key.to_string(),
                MarketMetrics {
                    grouping_key: grouping_key.to_string(),
                    open_orders: open,
                    floor_price: floor.map(|o| o.price),
                    floor_symbol: floor.map(|o| o.price_symbol.clone()),
                },
            );
        }
    }
}
