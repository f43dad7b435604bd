//! # Exact Currency Amounts
//!
//! **NO FLOATING POINT IN THE MONEY PATH**
//!
//! Prices cross three representations: the contract's wei integers, the
//! form strings a user types, and the display strings the UI renders. All
//! conversions are exact fixed-point arithmetic on u128.
//!
//! ## Why 18 Decimals?
//!
//! The payment currency uses the EVM convention of 18 decimals
//! (1 EMBER = 10^18 wei). Matching it exactly means a price survives the
//! round trip form string -> wei -> display string without drifting by a
//! single wei.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;

use crate::error::{AmountError, AmountResult};

/// Number of decimal places the currency carries.
pub const DECIMALS: u32 = 18;

/// Wei per whole EMBER.
const WEI_PER_EMBER: u128 = 10u128.pow(DECIMALS);

/// An exact currency amount, stored as wei in a u128.
///
/// # Range
///
/// - Minimum: 0 wei
/// - Maximum: 340,282,366,920,938,463,463.374607431768211455 EMBER
///
/// The contract hands prices over as `U256`; anything above the u128 range
/// is astronomically past total supply and is saturated on conversion.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct EmberAmount(u128);

impl EmberAmount {
    /// Zero wei.
    pub const ZERO: Self = Self(0);

    /// One whole EMBER.
    pub const ONE: Self = Self(WEI_PER_EMBER);

    /// Creates an amount from raw wei.
    #[inline]
    #[must_use]
    pub const fn from_wei(wei: u128) -> Self {
        Self(wei)
    }

    /// Returns the raw wei value.
    #[inline]
    #[must_use]
    pub const fn to_wei(self) -> u128 {
        self.0
    }

    /// Converts a contract-side `U256` wei value, saturating past u128.
    #[inline]
    #[must_use]
    pub fn from_wei_u256(wei: U256) -> Self {
        Self(u128::try_from(wei).unwrap_or(u128::MAX))
    }

    /// Returns the wei value as the contract-side `U256`.
    #[inline]
    #[must_use]
    pub fn to_wei_u256(self) -> U256 {
        U256::from(self.0)
    }

    /// Returns the whole-EMBER part.
    #[inline]
    #[must_use]
    pub const fn whole(self) -> u128 {
        self.0 / WEI_PER_EMBER
    }

    /// Returns the fractional part in wei (0 to 10^18 - 1).
    #[inline]
    #[must_use]
    pub const fn frac(self) -> u128 {
        self.0 % WEI_PER_EMBER
    }

    /// Returns true if zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parses a plain decimal string exactly.
    ///
    /// Accepts `"1"`, `"0.01"`, `"12.5"`. Rejects empty input, signs,
    /// exponents, bare or trailing dots, non-digits, more than 18
    /// fractional digits, and values past the wei range. Form input goes
    /// through here before any transaction is built.
    pub fn from_decimal_str(input: &str) -> AmountResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }
        if trimmed.starts_with('-') {
            return Err(AmountError::Negative);
        }

        let (whole_digits, frac_digits) = match trimmed.split_once('.') {
            None => (trimmed, ""),
            Some((whole, frac)) => {
                if whole.is_empty() || frac.is_empty() || frac.contains('.') {
                    return Err(AmountError::Malformed(trimmed.to_string()));
                }
                (whole, frac)
            }
        };

        let all_digits =
            |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole_digits) || !(frac_digits.is_empty() || all_digits(frac_digits)) {
            return Err(AmountError::Malformed(trimmed.to_string()));
        }
        if frac_digits.len() as u32 > DECIMALS {
            return Err(AmountError::TooPrecise);
        }

        let whole: u128 = whole_digits
            .parse()
            .map_err(|_| AmountError::Overflow)?;

        // Right-pad the fractional digits out to wei precision.
        let mut frac: u128 = 0;
        if !frac_digits.is_empty() {
            frac = frac_digits.parse().map_err(|_| AmountError::Overflow)?;
            frac *= 10u128.pow(DECIMALS - frac_digits.len() as u32);
        }

        whole
            .checked_mul(WEI_PER_EMBER)
            .and_then(|wei| wei.checked_add(frac))
            .map(Self)
            .ok_or(AmountError::Overflow)
    }
}

impl FromStr for EmberAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> AmountResult<Self> {
        Self::from_decimal_str(s)
    }
}

impl fmt::Display for EmberAmount {
    /// Renders the shortest exact decimal, always with a fractional part:
    /// `"1.0"`, `"0.01"`, `"0.001"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let padded = format!("{:018}", self.frac());
        let frac = padded.trim_end_matches('0');
        if frac.is_empty() {
            write!(f, "{}.0", self.whole())
        } else {
            write!(f, "{}.{frac}", self.whole())
        }
    }
}

impl fmt::Debug for EmberAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmberAmount({self})")
    }
}
