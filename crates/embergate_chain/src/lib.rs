//! # EMBERGATE Chain Vocabulary
//!
//! Types shared between the client and the on-chain escrow marketplace.
//!
//! ## Contents
//!
//! - [`abi`] - Solidity interfaces of the two external contracts
//! - [`slot`] - the escrow slot tuple and the explicit read contract
//! - [`amount`] - exact fixed-point currency (u128 wei, 18 decimals)
//!
//! This crate is pure data and arithmetic. Everything that talks to a
//! network lives in `embergate_market`.

pub mod abi;
pub mod amount;
pub mod error;
pub mod slot;

pub use amount::EmberAmount;
pub use error::{AmountError, AmountResult};
pub use slot::{EscrowSlot, SlotRead};
