//! # EMBERGATE Market Client
//!
//! Client-side view-model for the on-chain escrow marketplace. It keeps a
//! UI-ready listing set in sync with the contract and sequences the
//! multi-step flows needed to list, buy, and cancel relics.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────┐   ┌──────────────────┐
//! │  Wallet  │──▶│ SessionManager │──▶│     Session      │
//! └──────────┘   └───────────────┘   │ (immutable ctx)  │
//!                                    └───────┬──────────┘
//!                 trade flows               │ slot reads
//!                (approve/list,             ▼
//!                 buy, cancel)      ┌──────────────────┐
//!                       └──────────▶│   ListingBoard   │──▶ Vec<ListingView>
//!                    then refresh   │  (scan + publish)│     (snapshot)
//!                                   └───────┬──────────┘
//!                                           │ uri(id)
//!                                           ▼
//!                                   ┌──────────────────┐
//!                                   │ MetadataResolver │──▶ image URL / None
//!                                   └──────────────────┘
//! ```
//!
//! The chain, the wallet, and the metadata endpoint are reached through the
//! seam traits in [`bridge`]; in-memory doubles live next to them so every
//! flow runs in tests without a node.
//!
//! ## Consistency Model
//!
//! The listing set is rebuilt wholesale on every refresh and replaced
//! atomically; nothing is updated speculatively. Concurrent refreshes are
//! not serialized, but a monotonic scan sequence guarantees a slow stale
//! scan can never overwrite a newer result.

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod metadata;
pub mod session;
pub mod sync;
mod trade;

pub use bridge::{
    EscrowMarket, MetadataFetcher, MockChain, MockEscrowMarket, MockFetch, MockFetcher,
    MockRelicToken, MockWallet, RelicToken, WalletBridge,
};
pub use client::MarketClient;
pub use config::MarketConfig;
pub use error::{MarketError, MarketResult, MetadataError};
pub use metadata::{HttpMetadataFetcher, MetadataResolver};
pub use session::{Session, SessionManager, SessionOf};
pub use sync::{ListingBoard, ListingView};
