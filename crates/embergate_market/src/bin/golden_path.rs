//! # Golden Path
//!
//! The complete marketplace walk on the in-memory chain double:
//!
//! Connect → approve + list → second wallet buys → seller cancels the rest
//! → every step followed by a full re-scan of the slot range.
//!
//! No node, no network; this binary exists to watch the whole flow run and
//! to read the tracing output of each step.

use alloy_primitives::{Address, U256};
use serde_json::json;

use embergate_market::{
    MarketClient, MarketConfig, MockChain, MockFetcher, MockWallet,
};

fn print_listings(label: &str, client: &MarketClient<MockWallet, MockFetcher>) {
    let listings = client.listings();
    tracing::info!("{label}: {} active listing(s)", listings.len());
    for listing in listings.iter() {
        tracing::info!(
            "  slot {} | token {} | x{} | {} EMBER | image: {} | mine: {}",
            listing.slot.index,
            listing.slot.token_id,
            listing.slot.amount,
            listing.price_display,
            listing.image.as_deref().unwrap_or("-"),
            listing.owned_by_viewer,
        );
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().compact().init();

    let config = MarketConfig::default();
    tracing::info!(escrow = %config.escrow_address, token = %config.token_address, "golden path starting");

    // One shared chain, two wallets looking at it.
    let chain = MockChain::new();
    let fetcher = MockFetcher::new();
    let seller_account = Address::repeat_byte(0x5E);
    let buyer_account = Address::repeat_byte(0xB1);

    // Metadata for token 1: uri template on chain, document behind the gateway.
    chain.set_uri(U256::from(1), "ipfs://QmMeta/{id}.json");
    fetcher.set_json(
        format!("{}QmMeta/{}1.json", config.ipfs_gateway, "0".repeat(63)),
        json!({ "name": "First Relic", "image": "ipfs://QmArt/first-relic.png" }),
    );

    let seller = MarketClient::new(
        config.clone(),
        Some(MockWallet::new(chain.clone(), seller_account)),
        fetcher.clone(),
    );
    let buyer = MarketClient::new(
        config,
        Some(MockWallet::new(chain.clone(), buyer_account)),
        fetcher,
    );

    // Step 1: nobody is authorized yet, the silent restore stays out.
    assert!(seller.restore_if_authorized().await.unwrap().is_none());
    seller.connect().await.expect("seller connects");
    buyer.connect().await.expect("buyer connects");

    // Step 2: list token 1 at 0.01 EMBER. First listing also grants the
    // operator approval, so two transactions go out in strict order.
    seller
        .list_relic(U256::from(1), U256::from(1), "0.01")
        .await
        .expect("listing succeeds");
    seller
        .list_relic(U256::from(2), U256::from(3), "0.25")
        .await
        .expect("second listing succeeds");
    tracing::info!("submitted calls: {:?}", chain.tx_log());
    print_listings("seller view", &seller);

    // Step 3: the buyer refreshes and buys slot 0 at the rendered price.
    buyer.refresh().await.expect("buyer refresh");
    let target = buyer.listings()[0].clone();
    buyer
        .buy(target.slot.index, target.slot.price)
        .await
        .expect("purchase succeeds");
    print_listings("buyer view after purchase", &buyer);

    // Step 4: the seller re-scans and cancels the remaining listing.
    seller.refresh().await.expect("seller refresh");
    let remaining = seller.listings()[0].clone();
    seller
        .cancel(remaining.slot.index)
        .await
        .expect("cancel succeeds");
    print_listings("seller view after cancel", &seller);

    // Step 5: cancelling the same slot again is the contract's rejection.
    let rejected = seller.cancel(remaining.slot.index).await;
    tracing::info!("double cancel rejected as expected: {:?}", rejected.err());

    seller.disconnect();
    buyer.disconnect();

    assert!(seller.listings().is_empty());
    tracing::info!("golden path complete");
}
