//! # Chain Error Types
//!
//! Errors produced while converting user input into chain values.

use thiserror::Error;

/// Errors that can occur when parsing a decimal amount string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The input string was empty or whitespace.
    #[error("empty amount")]
    Empty,

    /// Negative amounts cannot exist on chain.
    #[error("negative amounts are not representable")]
    Negative,

    /// The input was not a plain decimal number.
    #[error("malformed decimal amount: {0:?}")]
    Malformed(String),

    /// More fractional digits than the currency carries.
    #[error("more than 18 fractional digits")]
    TooPrecise,

    /// The value does not fit in the wei range.
    #[error("amount overflows the wei range")]
    Overflow,
}

/// Result type for amount conversions.
pub type AmountResult<T> = Result<T, AmountError>;
