//! # Trade Orchestration
//!
//! The three mutating flows. Each one requires a session, runs its chain
//! calls in strict sequence, waits for inclusion, and only then triggers a
//! full re-scan. There is no speculative view update: a failed call
//! propagates its error and leaves the last successful listing set alone.

use alloy_primitives::U256;

use embergate_chain::EmberAmount;

use crate::bridge::{EscrowMarket, MetadataFetcher, RelicToken, WalletBridge};
use crate::client::MarketClient;
use crate::error::MarketResult;

impl<W: WalletBridge, F: MetadataFetcher> MarketClient<W, F> {
    /// Lists `amount` of `token_id` at the given decimal price.
    ///
    /// The price string is converted exactly before anything is submitted;
    /// malformed input fails with `InvalidAmount` and no transaction. When
    /// the escrow contract lacks operator approval, an approval
    /// transaction is submitted and confirmed first; approval and listing
    /// are two separate transactions in that strict order, and an approval
    /// failure aborts before the listing is attempted.
    pub async fn list_relic(
        &self,
        token_id: U256,
        amount: U256,
        price: &str,
    ) -> MarketResult<()> {
        let session = self.session()?;
        let price_wei = EmberAmount::from_decimal_str(price)?;

        let operator = session.escrow.address();
        if !session
            .token
            .is_approved_for_all(session.address, operator)
            .await?
        {
            tracing::info!(operator = %operator, "granting escrow operator approval");
            session.token.set_approval_for_all(operator, true).await?;
        }

        session
            .escrow
            .create_escrow(
                session.token.address(),
                token_id,
                amount,
                price_wei.to_wei_u256(),
            )
            .await?;
        tracing::info!(token_id = %token_id, price = %price_wei, "listing created");

        self.board().refresh(&session).await;
        Ok(())
    }

    /// Buys the listing at `slot_index` for exactly `price_wei`.
    ///
    /// `price_wei` is the value observed at render time, passed through
    /// unchanged; no re-read or re-validation happens here. If the
    /// contract's stored price moved in between, the contract rejects the
    /// payment and the view stays at its last successful state.
    pub async fn buy(&self, slot_index: u64, price_wei: U256) -> MarketResult<()> {
        let session = self.session()?;

        session.escrow.buy_with_payment(slot_index, price_wei).await?;
        tracing::info!(slot_index, "purchase confirmed");

        self.board().refresh(&session).await;
        Ok(())
    }

    /// Cancels the listing at `slot_index`.
    ///
    /// Only meaningful for the seller, but not blocked here; the contract
    /// is the final authority and rejects anyone else.
    pub async fn cancel(&self, slot_index: u64) -> MarketResult<()> {
        let session = self.session()?;

        session.escrow.remove_escrow(slot_index).await?;
        tracing::info!(slot_index, "listing removed");

        self.board().refresh(&session).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{MockChain, MockFetcher, MockWallet};
    use crate::config::MarketConfig;
    use crate::error::MarketError;
    use alloy_primitives::Address;
    use embergate_chain::AmountError;

    fn client_for(chain: &MockChain, account: Address) -> MarketClient<MockWallet, MockFetcher> {
        MarketClient::new(
            MarketConfig::default(),
            Some(MockWallet::new(chain.clone(), account)),
            MockFetcher::new(),
        )
    }

    #[tokio::test]
    async fn test_operations_need_a_session() {
        let chain = MockChain::new();
        let client = client_for(&chain, Address::repeat_byte(1));

        assert_eq!(
            client.list_relic(U256::from(1), U256::from(1), "0.01").await,
            Err(MarketError::SessionNotReady)
        );
        assert_eq!(
            client.buy(0, U256::from(1)).await,
            Err(MarketError::SessionNotReady)
        );
        assert_eq!(client.cancel(0).await, Err(MarketError::SessionNotReady));
        assert_eq!(client.refresh().await, Err(MarketError::SessionNotReady));
    }

    #[tokio::test]
    async fn test_invalid_price_submits_nothing() {
        let chain = MockChain::new();
        let client = client_for(&chain, Address::repeat_byte(1));
        client.connect().await.unwrap();

        let result = client
            .list_relic(U256::from(1), U256::from(1), "one ember")
            .await;
        assert!(matches!(result, Err(MarketError::InvalidAmount(_))));
        assert_eq!(
            client.list_relic(U256::from(1), U256::from(1), "-2").await,
            Err(MarketError::InvalidAmount(AmountError::Negative))
        );
        assert!(chain.tx_log().is_empty());
    }

    #[tokio::test]
    async fn test_approval_precedes_creation_exactly_once() {
        let chain = MockChain::new();
        let client = client_for(&chain, Address::repeat_byte(1));
        client.connect().await.unwrap();

        client
            .list_relic(U256::from(1), U256::from(1), "0.01")
            .await
            .unwrap();
        assert_eq!(chain.tx_log(), vec!["setApprovalForAll", "createEscrow"]);

        // Approval is already in place; only the creation goes out now.
        client
            .list_relic(U256::from(2), U256::from(1), "0.02")
            .await
            .unwrap();
        assert_eq!(
            chain.tx_log(),
            vec!["setApprovalForAll", "createEscrow", "createEscrow"]
        );
    }

    #[tokio::test]
    async fn test_approval_failure_aborts_listing() {
        let chain = MockChain::new();
        let client = client_for(&chain, Address::repeat_byte(1));
        client.connect().await.unwrap();
        chain.arm_failure(
            "setApprovalForAll",
            MarketError::Rejected {
                reason: "user denied".to_string(),
            },
        );

        let result = client.list_relic(U256::from(1), U256::from(1), "0.01").await;
        assert!(matches!(result, Err(MarketError::Rejected { .. })));
        // The creation step was never attempted.
        assert!(chain.tx_log().is_empty());
    }

    #[tokio::test]
    async fn test_failed_buy_leaves_view_alone() {
        let chain = MockChain::new();
        let seller = Address::repeat_byte(1);
        let buyer = Address::repeat_byte(2);
        chain.seed_listing(seller, U256::from(1), 1, U256::from(10));

        let client = client_for(&chain, buyer);
        client.connect().await.unwrap();
        client.refresh().await.unwrap();
        assert_eq!(client.listings().len(), 1);

        chain.arm_failure("buyWithPayment", MarketError::Dropped);
        assert_eq!(client.buy(0, U256::from(10)).await, Err(MarketError::Dropped));
        // No refresh happened; the stale-but-consistent view stands.
        assert_eq!(client.listings().len(), 1);

        // The retry goes through and the refresh empties the view.
        client.buy(0, U256::from(10)).await.unwrap();
        assert!(client.listings().is_empty());
    }
}
