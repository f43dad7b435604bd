//! # Escrow Slots
//!
//! Rust mirror of the escrow contract's storage tuple, plus the explicit
//! result of reading one.

use alloy_primitives::{Address, U256};

/// One escrow slot as the contract stores it.
///
/// The contract owns this data; the client's copy is only trusted for the
/// current render cycle. `index` doubles as the external identifier that buy
/// and cancel operations reference later.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EscrowSlot {
    /// Position of the slot in the contract's storage.
    pub index: u64,
    /// Account that created the listing.
    pub seller: Address,
    /// Token contract the escrowed tokens belong to.
    pub token_contract: Address,
    /// Identifier of the escrowed token.
    pub token_id: U256,
    /// Number of tokens held in escrow. Zero means empty/removed.
    pub amount: U256,
    /// Asking price in wei.
    pub price: U256,
}

impl EscrowSlot {
    /// Whether this slot holds a live listing.
    ///
    /// A zero amount is never an active listing regardless of the other
    /// fields.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.amount.is_zero()
    }
}

/// Outcome of reading a single escrow slot.
///
/// Deployments differ in how a removed slot shows up: some keep a
/// zero-amount tuple (`Vacant`), some shrink the backing storage so the read
/// reverts (`OutOfRange`). Both are modeled explicitly so callers cannot
/// confuse "skip this one" with "stop scanning".
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotRead {
    /// The slot holds an active listing.
    Listed(EscrowSlot),
    /// The read succeeded but the slot is empty. Scans continue past it.
    Vacant,
    /// The read reverted. Everything from here on is absent; scans stop.
    OutOfRange,
}

impl SlotRead {
    /// Classifies a raw slot tuple that was read successfully.
    ///
    /// Zero-amount tuples fold to [`SlotRead::Vacant`].
    #[must_use]
    pub fn from_tuple(slot: EscrowSlot) -> Self {
        if slot.is_active() {
            Self::Listed(slot)
        } else {
            Self::Vacant
        }
    }
}
