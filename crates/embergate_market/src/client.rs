//! # Market Client Facade
//!
//! Wires the session manager, the listing board, and the trade flows into
//! one entry point the presentation layer talks to.

use std::sync::Arc;

use crate::bridge::{MetadataFetcher, WalletBridge};
use crate::config::MarketConfig;
use crate::error::{MarketError, MarketResult};
use crate::metadata::MetadataResolver;
use crate::session::{SessionManager, SessionOf};
use crate::sync::{ListingBoard, ListingView};

/// The escrow marketplace client.
///
/// Construction wires every component from one [`MarketConfig`]; the
/// wallet and the metadata fetcher come in through their seam traits.
/// Session and listing data live only in memory for the client's lifetime.
pub struct MarketClient<W: WalletBridge, F> {
    config: MarketConfig,
    sessions: SessionManager<W>,
    board: ListingBoard<F>,
}

impl<W: WalletBridge, F: MetadataFetcher> MarketClient<W, F> {
    /// Creates a client. `wallet` is `None` when no extension is injected.
    #[must_use]
    pub fn new(config: MarketConfig, wallet: Option<W>, fetcher: F) -> Self {
        let resolver = MetadataResolver::new(fetcher, config.ipfs_gateway.clone());
        let board = ListingBoard::new(resolver, config.max_slots);
        Self {
            config,
            sessions: SessionManager::new(wallet),
            board,
        }
    }

    /// The configuration the client was built from.
    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// Prompts for wallet access and establishes a session.
    pub async fn connect(&self) -> MarketResult<Arc<SessionOf<W>>> {
        self.sessions.connect().await
    }

    /// Restores an already-authorized session without prompting, if any.
    pub async fn restore_if_authorized(&self) -> MarketResult<Option<Arc<SessionOf<W>>>> {
        self.sessions.restore_if_authorized().await
    }

    /// Drops the current session.
    pub fn disconnect(&self) {
        self.sessions.disconnect();
    }

    /// Whether a session is established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.sessions.is_connected()
    }

    /// Rebuilds the listing set from the chain. Returns the number of
    /// active listings found.
    pub async fn refresh(&self) -> MarketResult<usize> {
        let session = self.session()?;
        Ok(self.board.refresh(&session).await)
    }

    /// Snapshot of the current listing set.
    #[must_use]
    pub fn listings(&self) -> Arc<Vec<ListingView>> {
        self.board.listings()
    }

    pub(crate) fn session(&self) -> MarketResult<Arc<SessionOf<W>>> {
        self.sessions.current().ok_or(MarketError::SessionNotReady)
    }

    pub(crate) fn board(&self) -> &ListingBoard<F> {
        &self.board
    }
}
