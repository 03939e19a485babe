//! Error types for the nftmart marketplace engine.
//!
//! All errors use the `NM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Validation errors (malformed / out-of-range input)
//! - 2xx: Authorization errors
//! - 3xx: Not-found / market-state errors
//! - 4xx: Funds errors (checked pre-transfer)
//! - 5xx: Transfer-reconciliation errors
//! - 9xx: General / internal errors
//!
//! Partial transfer failures outside the mandatory fee step are **not**
//! errors: the affected items are skipped while unaffected items proceed.
//! Defensive clamps (fee above price, negative payment) are applied
//! silently, never raised.

use rust_decimal::Decimal;
use thiserror::Error;

/// Central error enum for all marketplace operations.
#[derive(Debug, Error)]
pub enum MarketError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// The request failed shape/bounds validation.
    #[error("NM_ERR_100: Invalid request: {reason}")]
    Validation { reason: String },

    /// The price is non-positive or exceeds the settlement token precision.
    #[error("NM_ERR_101: Invalid price: {reason}")]
    InvalidPrice { reason: String },

    // =================================================================
    // Authorization Errors (2xx)
    // =================================================================
    /// The caller lacks the rights for this operation.
    #[error("NM_ERR_200: Not authorized: {reason}")]
    Authorization { reason: String },

    // =================================================================
    // Not-found / market-state Errors (3xx)
    // =================================================================
    /// An unknown collection or settlement token.
    #[error("NM_ERR_300: Not found: {what}")]
    NotFound { what: String },

    /// The collection exists but its market has not been enabled.
    #[error("NM_ERR_301: Market not enabled for collection {0}")]
    MarketNotFound(String),

    /// The market for this collection already exists.
    #[error("NM_ERR_302: Market already enabled for collection {0}")]
    AlreadyEnabled(String),

    /// An open order already exists for this instance.
    #[error("NM_ERR_303: Duplicate open order for instance {0}")]
    DuplicateOrder(crate::NftId),

    // =================================================================
    // Funds Errors (4xx)
    // =================================================================
    /// The buyer cannot cover fee + payment. Checked before any transfer.
    #[error("NM_ERR_400: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    // =================================================================
    // Transfer-reconciliation Errors (5xx)
    // =================================================================
    /// A buy batch contains an order owned by the buyer.
    #[error("NM_ERR_500: Self-trade blocked: buyer owns order for instance {0}")]
    SelfTrade(crate::NftId),

    /// The mandatory market-fee transfer was not confirmed by the emitted
    /// log. Fee payment is all-or-nothing for the batch, so the whole call
    /// aborts with no marketplace state mutated.
    #[error("NM_ERR_501: Fee transfer of {quantity} {symbol} unconfirmed")]
    FeeTransferUnconfirmed { symbol: String, quantity: Decimal },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("NM_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error at the invocation boundary.
    #[error("NM_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, MarketError>;

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NftId;

    #[test]
    fn error_display_contains_prefix() {
        let err = MarketError::MarketNotFound("FOO".to_string());
        let msg = format!("{err}");
        assert!(msg.starts_with("NM_ERR_301"), "Got: {msg}");
        assert!(msg.contains("FOO"));
    }

    #[test]
    fn insufficient_funds_display() {
        let err = MarketError::InsufficientFunds {
            needed: Decimal::new(100, 0),
            available: Decimal::new(50, 0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("NM_ERR_400"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn all_errors_have_nm_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(MarketError::Validation {
                reason: "test".into(),
            }),
            Box::new(MarketError::Authorization {
                reason: "test".into(),
            }),
            Box::new(MarketError::AlreadyEnabled("FOO".into())),
            Box::new(MarketError::SelfTrade(NftId(1))),
            Box::new(MarketError::FeeTransferUnconfirmed {
                symbol: "USD".into(),
                quantity: Decimal::TEN,
            }),
            Box::new(MarketError::Internal("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("NM_ERR_"),
                "Error missing NM_ERR_ prefix: {msg}"
            );
        }
    }
}
