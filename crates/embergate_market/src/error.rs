//! # Market Error Types
//!
//! All errors the client surfaces to the presentation layer, plus the
//! metadata errors that are swallowed before they get that far.

use embergate_chain::AmountError;
use thiserror::Error;

/// Errors that can occur in the market client.
///
/// Session and orchestration failures propagate to the caller for
/// user-visible reporting; none of them trigger an automatic retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// No wallet extension is present to ask for accounts.
    #[error("no wallet provider detected")]
    NoWalletProvider,

    /// The wallet's authorization prompt was declined.
    #[error("wallet authorization rejected")]
    UserRejected,

    /// An operation needs a connected session and none exists.
    #[error("no active session; connect a wallet first")]
    SessionNotReady,

    /// Malformed numeric input from the listing form. Nothing was
    /// submitted.
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// Submission was declined before it reached the chain.
    #[error("transaction rejected by wallet: {reason}")]
    Rejected {
        /// Reason reported by the wallet.
        reason: String,
    },

    /// The call made it on chain and reverted, or a view call reverted.
    #[error("call reverted: {reason}")]
    Reverted {
        /// Revert reason, as far as the provider exposes one.
        reason: String,
    },

    /// The transaction was submitted but never included.
    #[error("transaction dropped before inclusion")]
    Dropped,

    /// The wallet provider failed on transport level.
    #[error("wallet provider error: {reason}")]
    Provider {
        /// Underlying provider message.
        reason: String,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for market operations.
pub type MarketResult<T> = Result<T, MarketError>;

/// Failures while resolving off-chain metadata.
///
/// These never leave the metadata resolver: each one downgrades exactly one
/// listing to "no image" and is logged at debug level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// The endpoint could not be reached.
    #[error("metadata endpoint unreachable: {0}")]
    Unreachable(String),

    /// The endpoint answered with a non-success status.
    #[error("metadata endpoint returned status {0}")]
    Status(u16),

    /// The body was not a JSON document.
    #[error("metadata body is not JSON: {0}")]
    NotJson(String),
}
