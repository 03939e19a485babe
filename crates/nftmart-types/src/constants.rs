//! System-wide constants for the nftmart marketplace engine.

/// Maximum number of NFT instance ids a single operation may touch.
///
/// Bounds the compute and state-diff cost of one invocation; every batch
/// iteration in the engine honours this cap.
pub const MAX_BATCH_IDS: usize = 50;

/// Maximum fee in basis points (10000 bp = 100%).
pub const MAX_FEE_BP: u16 = 10_000;

/// Basis-point denominator.
pub const BP_DENOMINATOR: u64 = 10_000;

/// The account that custodies listed NFT instances and routes payments.
pub const MARKET_ACCOUNT: &str = "nftmarket";

/// Component name of the fungible-token ledger contract.
pub const TOKENS_CONTRACT: &str = "tokens";

/// Component name of the NFT ownership ledger contract.
pub const NFT_CONTRACT: &str = "nft";

/// Action name for custody / balance movements on both ledgers.
pub const TRANSFER_ACTION: &str = "transfer";

/// Maximum length of a collection or token symbol.
pub const MAX_SYMBOL_LEN: usize = 10;

/// Account name length bounds.
pub const MIN_ACCOUNT_LEN: usize = 3;
pub const MAX_ACCOUNT_LEN: usize = 16;
