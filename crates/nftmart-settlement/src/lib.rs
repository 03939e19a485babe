//! # nftmart-settlement
//!
//! Settlement plane of the marketplace: the multi-seller `buy` operation.
//!
//! ## Settlement flow
//!
//! ```text
//! match orders → fee/payment split → funds check
//!   → fee transfer (all-or-nothing)
//!   → payment per seller group (partial fill on failure)
//!   → custody hand-off → order removal → SaleSettled
//! ```
//!
//! Every transfer is reconciled against the emitted log; an order only
//! leaves the book once its seller group's payment was confirmed there.

pub mod buy;
pub mod fees;

pub use buy::{BuyOutcome, SettlementEngine};
pub use fees::{market_fee, seller_payment};
