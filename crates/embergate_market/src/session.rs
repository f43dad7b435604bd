//! # Session Management
//!
//! Exactly one wallet/contract binding is live at a time. The binding is an
//! immutable [`Session`] context: connect builds a complete new one and
//! publishes it in a single swap, disconnect drops the whole thing. No
//! reader can ever observe a half-updated session.

use std::sync::Arc;

use alloy_primitives::Address;
use parking_lot::RwLock;

use crate::bridge::WalletBridge;
use crate::error::{MarketError, MarketResult};

/// One established wallet/contract binding.
///
/// Valid from connect to disconnect. The contract handles sign as
/// [`Session::address`] for their whole lifetime; rebinding means building
/// a new session, never mutating this one.
pub struct Session<E, T> {
    /// The active account.
    pub address: Address,
    /// Escrow contract handle bound to the active account.
    pub escrow: E,
    /// Token contract handle bound to the active account.
    pub token: T,
}

/// Type of the session a wallet bridge produces.
pub type SessionOf<W> =
    Session<<W as WalletBridge>::Escrow, <W as WalletBridge>::Token>;

/// Holds the current session, if any.
///
/// `wallet` is `None` when no wallet extension is present; only an explicit
/// [`SessionManager::connect`] surfaces that as an error, the silent
/// startup restore just stays disconnected.
pub struct SessionManager<W: WalletBridge> {
    wallet: Option<W>,
    current: RwLock<Option<Arc<SessionOf<W>>>>,
}

impl<W: WalletBridge> SessionManager<W> {
    /// Creates a manager over an optionally-present wallet.
    #[must_use]
    pub fn new(wallet: Option<W>) -> Self {
        Self {
            wallet,
            current: RwLock::new(None),
        }
    }

    /// Requests account access and establishes a new session.
    ///
    /// Fails with [`MarketError::NoWalletProvider`] when no wallet is
    /// present and [`MarketError::UserRejected`] when the prompt is
    /// declined. An empty account list counts as a declined prompt.
    pub async fn connect(&self) -> MarketResult<Arc<SessionOf<W>>> {
        let wallet = self.wallet.as_ref().ok_or(MarketError::NoWalletProvider)?;
        let accounts = wallet.request_accounts().await?;
        let Some(address) = accounts.first().copied() else {
            return Err(MarketError::UserRejected);
        };
        Ok(self.establish(wallet, address))
    }

    /// Re-establishes a session for an already-authorized account, without
    /// prompting. Returns `None` (and stays disconnected) when there is no
    /// wallet or no prior authorization.
    pub async fn restore_if_authorized(&self) -> MarketResult<Option<Arc<SessionOf<W>>>> {
        let Some(wallet) = self.wallet.as_ref() else {
            return Ok(None);
        };
        let accounts = wallet.authorized_accounts().await?;
        Ok(accounts
            .first()
            .map(|address| self.establish(wallet, *address)))
    }

    /// Drops the current session in one swap. Wallet-level permission is
    /// not revoked; only local state is cleared.
    pub fn disconnect(&self) {
        if self.current.write().take().is_some() {
            tracing::info!("session disconnected");
        }
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> Option<Arc<SessionOf<W>>> {
        self.current.read().clone()
    }

    /// Whether a session is established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.current.read().is_some()
    }

    fn establish(&self, wallet: &W, address: Address) -> Arc<SessionOf<W>> {
        let (escrow, token) = wallet.bind_contracts(address);
        let session = Arc::new(Session {
            address,
            escrow,
            token,
        });
        *self.current.write() = Some(Arc::clone(&session));
        tracing::info!(address = %address, "session established");
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{MockChain, MockWallet};

    fn wallet(chain: &MockChain) -> MockWallet {
        MockWallet::new(chain.clone(), Address::repeat_byte(0xAA))
    }

    #[tokio::test]
    async fn test_connect_without_wallet() {
        let manager: SessionManager<MockWallet> = SessionManager::new(None);
        assert_eq!(
            manager.connect().await.err(),
            Some(MarketError::NoWalletProvider)
        );
        assert!(!manager.is_connected());
    }

    #[tokio::test]
    async fn test_connect_rejected() {
        let chain = MockChain::new();
        let mut wallet = wallet(&chain);
        wallet.reject_prompt = true;
        let manager = SessionManager::new(Some(wallet));

        assert_eq!(manager.connect().await.err(), Some(MarketError::UserRejected));
        assert!(manager.current().is_none());
    }

    #[tokio::test]
    async fn test_connect_binds_to_first_account() {
        let chain = MockChain::new();
        let manager = SessionManager::new(Some(wallet(&chain)));

        let session = manager.connect().await.unwrap();
        assert_eq!(session.address, Address::repeat_byte(0xAA));
        assert!(manager.is_connected());
    }

    #[tokio::test]
    async fn test_restore_only_when_authorized() {
        let chain = MockChain::new();
        let manager = SessionManager::new(Some(wallet(&chain)));
        assert!(manager.restore_if_authorized().await.unwrap().is_none());
        assert!(!manager.is_connected());

        let mut authorized = wallet(&chain);
        authorized.pre_authorized = true;
        let manager = SessionManager::new(Some(authorized));
        let session = manager.restore_if_authorized().await.unwrap();
        assert_eq!(session.unwrap().address, Address::repeat_byte(0xAA));
        assert!(manager.is_connected());
    }

    #[tokio::test]
    async fn test_restore_without_wallet_is_silent() {
        let manager: SessionManager<MockWallet> = SessionManager::new(None);
        assert!(manager.restore_if_authorized().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disconnect_clears_everything() {
        let chain = MockChain::new();
        let manager = SessionManager::new(Some(wallet(&chain)));
        manager.connect().await.unwrap();

        manager.disconnect();
        assert!(!manager.is_connected());
        assert!(manager.current().is_none());
        // Idempotent.
        manager.disconnect();
    }
}
