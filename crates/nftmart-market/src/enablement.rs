//! One-time market enablement for a collection.
//!
//! Creates the order and metrics tables. Only the collection's registered
//! issuer may enable its market, and only once.

use nftmart_ledger::{Chain, OrderStore};
use nftmart_types::{
    ChainContext, CollectionMarketConfig, EnableMarketRequest, MarketError, MarketEvent, Result,
};

/// Result of a successful enablement.
#[derive(Debug)]
pub struct EnableOutcome {
    pub config: CollectionMarketConfig,
    pub events: Vec<MarketEvent>,
}

/// Creates a collection's market tables.
pub struct MarketEnablement<'a, C: Chain> {
    store: &'a mut OrderStore,
    chain: &'a C,
}

impl<'a, C: Chain> MarketEnablement<'a, C> {
    pub fn new(store: &'a mut OrderStore, chain: &'a C) -> Self {
        Self { store, chain }
    }

    /// Enable the market for a collection.
    ///
    /// # Errors
    /// - `Authorization` if the call is unsigned or the caller is not the
    ///   collection's registered issuer
    /// - `NotFound` for an unknown collection
    /// - `AlreadyEnabled` if the order table already exists
    pub fn enable(&mut self, req: &EnableMarketRequest, ctx: &ChainContext) -> Result<EnableOutcome> {
        ctx.require_signed()?;
        req.validate()?;

        let issuer = self
            .chain
            .collection_issuer(&req.collection)
            .ok_or_else(|| MarketError::NotFound {
                what: format!("collection {}", req.collection),
            })?;
        if issuer != ctx.caller {
            return Err(MarketError::Authorization {
                reason: format!(
                    "{} is not the issuer of {} ({issuer} is)",
                    ctx.caller, req.collection
                ),
            });
        }

        let config = CollectionMarketConfig {
            collection: req.collection.clone(),
            issuer,
            enabled_at: ctx.now,
        };
        self.store.enable(config.clone())?;

        tracing::info!(collection = %req.collection, issuer = %config.issuer, "Market enabled");
        Ok(EnableOutcome {
            config,
            events: vec![MarketEvent::MarketEnabled {
                collection: req.collection.clone(),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use nftmart_ledger::harness::MemoryChain;
    use nftmart_types::AccountId;

    use super::*;

    fn chain() -> MemoryChain {
        let mut chain = MemoryChain::new();
        chain.define_collection("FOO", "issuer");
        chain
    }

    fn request() -> EnableMarketRequest {
        EnableMarketRequest {
            collection: "FOO".to_string(),
        }
    }

    #[test]
    fn issuer_enables_market() {
        let chain = chain();
        let mut store = OrderStore::new();
        let outcome = MarketEnablement::new(&mut store, &chain)
            .enable(&request(), &ChainContext::signed("issuer"))
            .unwrap();

        assert!(store.is_enabled("FOO"));
        assert_eq!(outcome.config.issuer, AccountId::new("issuer"));
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].name(), "marketEnabled");
    }

    #[test]
    fn non_issuer_rejected() {
        let chain = chain();
        let mut store = OrderStore::new();
        let err = MarketEnablement::new(&mut store, &chain)
            .enable(&request(), &ChainContext::signed("mallory"))
            .unwrap_err();
        assert!(matches!(err, MarketError::Authorization { .. }));
        assert!(!store.is_enabled("FOO"));
    }

    #[test]
    fn unsigned_rejected() {
        let chain = chain();
        let mut store = OrderStore::new();
        let err = MarketEnablement::new(&mut store, &chain)
            .enable(&request(), &ChainContext::unsigned("issuer"))
            .unwrap_err();
        assert!(matches!(err, MarketError::Authorization { .. }));
    }

    #[test]
    fn unknown_collection_rejected() {
        let chain = chain();
        let mut store = OrderStore::new();
        let err = MarketEnablement::new(&mut store, &chain)
            .enable(
                &EnableMarketRequest {
                    collection: "BAR".to_string(),
                },
                &ChainContext::signed("issuer"),
            )
            .unwrap_err();
        assert!(matches!(err, MarketError::NotFound { .. }));
    }

    #[test]
    fn double_enable_rejected() {
        let chain = chain();
        let mut store = OrderStore::new();
        let ctx = ChainContext::signed("issuer");
        MarketEnablement::new(&mut store, &chain)
            .enable(&request(), &ctx)
            .unwrap();
        let err = MarketEnablement::new(&mut store, &chain)
            .enable(&request(), &ctx)
            .unwrap_err();
        assert!(matches!(err, MarketError::AlreadyEnabled(_)));
    }
}
