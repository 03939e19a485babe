//! # nftmart-market
//!
//! Order-lifecycle plane of the marketplace: one-time market enablement,
//! listing, repricing and cancellation.
//!
//! ## Operation flow
//!
//! ```text
//! enableMarket → sell → (changePrice | cancel | buy)
//! ```
//!
//! Every operation validates its full request, then confirms the custody
//! side effects it depends on from the emitted log before touching the
//! order table. Custody transfer and order mutation are two independent
//! steps chained only through that log: the engine observes outcomes,
//! never assumes them.

pub mod enablement;
pub mod listing;
pub mod price;
pub mod pricing;

pub use enablement::{EnableOutcome, MarketEnablement};
pub use listing::{ListingManager, SellOutcome};
pub use pricing::{CancelOutcome, PriceCancelManager, PriceChangeOutcome};
