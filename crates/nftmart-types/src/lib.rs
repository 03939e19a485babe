//! # nftmart-types
//!
//! Shared types, errors, and configuration for the **nftmart** marketplace
//! engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`NftId`], [`OrderSeq`], [`AccountId`]
//! - **Order model**: [`SellOrder`], [`CustodyTag`]
//! - **Event model**: [`MarketEvent`], [`SellerPayout`]
//! - **Request model**: [`EnableMarketRequest`], [`SellRequest`],
//!   [`ChangePriceRequest`], [`CancelRequest`], [`BuyRequest`]
//! - **Invocation context**: [`ChainContext`]
//! - **Configuration**: [`CollectionMarketConfig`], [`MarketMetrics`]
//! - **Errors**: [`MarketError`] with `NM_ERR_` prefix codes
//! - **Constants**: batch caps and contract names

pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod event;
pub mod ids;
pub mod metrics;
pub mod order;
pub mod request;

// Re-export all primary types at crate root for ergonomic imports:
//   use nftmart_types::{SellOrder, MarketEvent, MarketError, ...};

pub use config::*;
pub use context::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use metrics::*;
pub use order::*;
pub use request::*;

// Constants are accessed via `nftmart_types::constants::FOO`
// (not re-exported to avoid name collisions).
