//! # Seam Traits
//!
//! Interfaces to the three external collaborators: the injected wallet, the
//! two contracts, and the off-chain metadata endpoint. The client never
//! talks to any of them directly; it goes through these traits, and the
//! in-memory doubles below stand in for them in tests, benches, and the
//! `golden_path` binary.
//!
//! ```text
//! client depends on:      environment implements:
//! ┌───────────────┐       ┌──────────────────────┐
//! │ WalletBridge  │ ◀──── │ injected wallet      │
//! │ EscrowMarket  │ ◀──── │ escrow contract      │
//! │ RelicToken    │ ◀──── │ token contract       │
//! │ MetadataFetch │ ◀──── │ HTTP gateway         │
//! └───────────────┘       └──────────────────────┘
//! ```

// The whole client is single-threaded cooperative; callers never need Send
// futures from these seams.
#![allow(async_fn_in_trait)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use parking_lot::Mutex;

use embergate_chain::{EscrowSlot, SlotRead};

use crate::error::{MarketError, MarketResult, MetadataError};

/// Interface to the browser-injected wallet.
///
/// Binding yields contract handles that sign as the given account; the
/// handles stay valid until the session that owns them is dropped.
pub trait WalletBridge {
    /// Escrow contract handle type produced by [`Self::bind_contracts`].
    type Escrow: EscrowMarket;
    /// Token contract handle type produced by [`Self::bind_contracts`].
    type Token: RelicToken;

    /// Prompts the user for account access. A non-empty list means success.
    async fn request_accounts(&self) -> MarketResult<Vec<Address>>;

    /// Lists accounts that are already authorized, without prompting.
    async fn authorized_accounts(&self) -> MarketResult<Vec<Address>>;

    /// Binds both contract handles to the given signer.
    fn bind_contracts(&self, signer: Address) -> (Self::Escrow, Self::Token);
}

/// Interface to the escrow marketplace contract.
///
/// Mutating calls are fire-and-wait: they resolve only once the transaction
/// is included, or fail with the taxonomy in [`MarketError`].
pub trait EscrowMarket {
    /// Deployed address of the escrow contract.
    fn address(&self) -> Address;

    /// Places tokens in escrow at the next free slot.
    async fn create_escrow(
        &self,
        token_contract: Address,
        token_id: U256,
        amount: U256,
        price_wei: U256,
    ) -> MarketResult<()>;

    /// Buys the listing at `slot_index`, carrying `payment_wei` as value.
    async fn buy_with_payment(&self, slot_index: u64, payment_wei: U256) -> MarketResult<()>;

    /// Reads one slot.
    ///
    /// Never fails: implementations fold reverts and transport failures
    /// into [`SlotRead::OutOfRange`], which scans treat as the end of
    /// valid data.
    async fn escrow_slot(&self, slot_index: u64) -> SlotRead;

    /// Removes the listing at `slot_index`. The contract decides whether
    /// the caller may.
    async fn remove_escrow(&self, slot_index: u64) -> MarketResult<()>;
}

/// Interface to the relic token contract.
pub trait RelicToken {
    /// Deployed address of the token contract.
    fn address(&self) -> Address;

    /// Grants or revokes `operator` over all of the signer's tokens.
    async fn set_approval_for_all(&self, operator: Address, approved: bool) -> MarketResult<()>;

    /// Queries an operator grant.
    async fn is_approved_for_all(&self, owner: Address, operator: Address) -> MarketResult<bool>;

    /// Metadata URI template for a token, with the literal `{id}`
    /// placeholder unexpanded.
    async fn uri(&self, token_id: U256) -> MarketResult<String>;
}

/// Interface to the off-chain metadata endpoint.
pub trait MetadataFetcher {
    /// Fetches `url` and parses the body as JSON.
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, MetadataError>;
}

// ============================================================================
// MOCK IMPLEMENTATIONS (For Testing)
// ============================================================================

/// Shared state of the in-memory chain double.
#[derive(Default)]
struct MockChainState {
    /// Slot storage. `None` reads as a zero-amount tuple.
    slots: Vec<Option<EscrowSlot>>,
    /// Indices whose reads revert regardless of content.
    revert_reads: HashSet<u64>,
    /// Operator grants, keyed by (owner, operator).
    approvals: HashMap<(Address, Address), bool>,
    /// URI templates by token id.
    uris: HashMap<U256, String>,
    /// Names of successfully submitted mutating calls, in order.
    tx_log: Vec<String>,
    /// One-shot failures keyed by mutating call name.
    failures: HashMap<&'static str, MarketError>,
}

/// In-memory chain double shared by mock wallet and contract handles.
///
/// Cloning shares the underlying state, the way every handle on a real
/// chain observes the same ledger.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<Mutex<MockChainState>>,
}

impl MockChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Address the mock escrow contract pretends to live at.
    #[must_use]
    pub fn escrow_address() -> Address {
        Address::repeat_byte(0xE5)
    }

    /// Address the mock token contract pretends to live at.
    #[must_use]
    pub fn token_address() -> Address {
        Address::repeat_byte(0xF0)
    }

    /// Seeds an active listing directly, bypassing the approval flow.
    /// Returns the slot index.
    pub fn seed_listing(
        &self,
        seller: Address,
        token_id: U256,
        amount: u64,
        price_wei: U256,
    ) -> u64 {
        let mut state = self.state.lock();
        let index = state.slots.len() as u64;
        state.slots.push(Some(EscrowSlot {
            index,
            seller,
            token_contract: Self::token_address(),
            token_id,
            amount: U256::from(amount),
            price: price_wei,
        }));
        index
    }

    /// Seeds a raw slot tuple as-is, zero amounts included.
    pub fn seed_raw_slot(&self, slot: EscrowSlot) {
        self.state.lock().slots.push(Some(slot));
    }

    /// Makes every read of `slot_index` revert from now on.
    pub fn arm_revert_read(&self, slot_index: u64) {
        self.state.lock().revert_reads.insert(slot_index);
    }

    /// Arms a one-shot failure for the named mutating call
    /// (`"setApprovalForAll"`, `"createEscrow"`, `"buyWithPayment"`,
    /// `"removeEscrow"`). The call consumes the failure and mutates
    /// nothing.
    pub fn arm_failure(&self, call: &'static str, error: MarketError) {
        self.state.lock().failures.insert(call, error);
    }

    /// Sets an operator grant directly.
    pub fn set_approval(&self, owner: Address, operator: Address, approved: bool) {
        self.state.lock().approvals.insert((owner, operator), approved);
    }

    /// Registers a URI template for a token.
    pub fn set_uri(&self, token_id: U256, uri: impl Into<String>) {
        self.state.lock().uris.insert(token_id, uri.into());
    }

    /// Names of the mutating calls submitted so far, in submission order.
    #[must_use]
    pub fn tx_log(&self) -> Vec<String> {
        self.state.lock().tx_log.clone()
    }

    fn take_failure(&self, call: &'static str) -> Option<MarketError> {
        self.state.lock().failures.remove(call)
    }
}

/// Mock wallet bound to a [`MockChain`].
pub struct MockWallet {
    chain: MockChain,
    accounts: Vec<Address>,
    /// Accounts count as already authorized (silent restore succeeds).
    pub pre_authorized: bool,
    /// The access prompt is declined.
    pub reject_prompt: bool,
}

impl MockWallet {
    /// Creates a wallet exposing a single account.
    #[must_use]
    pub fn new(chain: MockChain, account: Address) -> Self {
        Self {
            chain,
            accounts: vec![account],
            pre_authorized: false,
            reject_prompt: false,
        }
    }
}

impl WalletBridge for MockWallet {
    type Escrow = MockEscrowMarket;
    type Token = MockRelicToken;

    async fn request_accounts(&self) -> MarketResult<Vec<Address>> {
        if self.reject_prompt {
            return Err(MarketError::UserRejected);
        }
        Ok(self.accounts.clone())
    }

    async fn authorized_accounts(&self) -> MarketResult<Vec<Address>> {
        if self.pre_authorized {
            Ok(self.accounts.clone())
        } else {
            Ok(Vec::new())
        }
    }

    fn bind_contracts(&self, signer: Address) -> (MockEscrowMarket, MockRelicToken) {
        (
            MockEscrowMarket {
                chain: self.chain.clone(),
                signer,
            },
            MockRelicToken {
                chain: self.chain.clone(),
                signer,
            },
        )
    }
}

/// Mock escrow contract handle signing as one account.
pub struct MockEscrowMarket {
    chain: MockChain,
    signer: Address,
}

impl EscrowMarket for MockEscrowMarket {
    fn address(&self) -> Address {
        MockChain::escrow_address()
    }

    async fn create_escrow(
        &self,
        token_contract: Address,
        token_id: U256,
        amount: U256,
        price_wei: U256,
    ) -> MarketResult<()> {
        if let Some(error) = self.chain.take_failure("createEscrow") {
            return Err(error);
        }
        let mut state = self.chain.state.lock();
        let approved = state
            .approvals
            .get(&(self.signer, MockChain::escrow_address()))
            .copied()
            .unwrap_or(false);
        if !approved {
            return Err(MarketError::Reverted {
                reason: "missing operator approval".to_string(),
            });
        }
        let index = state.slots.len() as u64;
        state.slots.push(Some(EscrowSlot {
            index,
            seller: self.signer,
            token_contract,
            token_id,
            amount,
            price: price_wei,
        }));
        state.tx_log.push("createEscrow".to_string());
        Ok(())
    }

    async fn buy_with_payment(&self, slot_index: u64, payment_wei: U256) -> MarketResult<()> {
        if let Some(error) = self.chain.take_failure("buyWithPayment") {
            return Err(error);
        }
        let mut state = self.chain.state.lock();
        let slot = state
            .slots
            .get(slot_index as usize)
            .and_then(Option::as_ref)
            .filter(|slot| slot.is_active())
            .cloned();
        let Some(slot) = slot else {
            return Err(MarketError::Reverted {
                reason: "no active escrow at slot".to_string(),
            });
        };
        if slot.price != payment_wei {
            return Err(MarketError::Reverted {
                reason: "payment does not match price".to_string(),
            });
        }
        state.slots[slot_index as usize] = None;
        state.tx_log.push("buyWithPayment".to_string());
        Ok(())
    }

    async fn escrow_slot(&self, slot_index: u64) -> SlotRead {
        let state = self.chain.state.lock();
        if state.revert_reads.contains(&slot_index) {
            return SlotRead::OutOfRange;
        }
        match state.slots.get(slot_index as usize) {
            None => SlotRead::OutOfRange,
            Some(None) => SlotRead::Vacant,
            Some(Some(slot)) => SlotRead::from_tuple(slot.clone()),
        }
    }

    async fn remove_escrow(&self, slot_index: u64) -> MarketResult<()> {
        if let Some(error) = self.chain.take_failure("removeEscrow") {
            return Err(error);
        }
        let mut state = self.chain.state.lock();
        let seller = state
            .slots
            .get(slot_index as usize)
            .and_then(Option::as_ref)
            .filter(|slot| slot.is_active())
            .map(|slot| slot.seller);
        let Some(seller) = seller else {
            return Err(MarketError::Reverted {
                reason: "no active escrow at slot".to_string(),
            });
        };
        if seller != self.signer {
            return Err(MarketError::Reverted {
                reason: "caller is not the seller".to_string(),
            });
        }
        state.slots[slot_index as usize] = None;
        state.tx_log.push("removeEscrow".to_string());
        Ok(())
    }
}

/// Mock token contract handle signing as one account.
pub struct MockRelicToken {
    chain: MockChain,
    signer: Address,
}

impl RelicToken for MockRelicToken {
    fn address(&self) -> Address {
        MockChain::token_address()
    }

    async fn set_approval_for_all(&self, operator: Address, approved: bool) -> MarketResult<()> {
        if let Some(error) = self.chain.take_failure("setApprovalForAll") {
            return Err(error);
        }
        let mut state = self.chain.state.lock();
        state.approvals.insert((self.signer, operator), approved);
        state.tx_log.push("setApprovalForAll".to_string());
        Ok(())
    }

    async fn is_approved_for_all(&self, owner: Address, operator: Address) -> MarketResult<bool> {
        Ok(self
            .chain
            .state
            .lock()
            .approvals
            .get(&(owner, operator))
            .copied()
            .unwrap_or(false))
    }

    async fn uri(&self, token_id: U256) -> MarketResult<String> {
        self.chain
            .state
            .lock()
            .uris
            .get(&token_id)
            .cloned()
            .ok_or_else(|| MarketError::Reverted {
                reason: "no uri for token".to_string(),
            })
    }
}

/// Canned response of the mock metadata endpoint.
#[derive(Clone, Debug)]
pub enum MockFetch {
    /// A well-formed JSON document.
    Json(serde_json::Value),
    /// A body that is not JSON.
    Garbage,
    /// The endpoint cannot be reached.
    Unreachable,
}

/// Mock metadata fetcher. Unregistered URLs read as unreachable.
#[derive(Clone, Default)]
pub struct MockFetcher {
    responses: Arc<Mutex<HashMap<String, MockFetch>>>,
}

impl MockFetcher {
    /// Creates a fetcher with no registered URLs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a canned response for `url`.
    pub fn set(&self, url: impl Into<String>, response: MockFetch) {
        self.responses.lock().insert(url.into(), response);
    }

    /// Registers a JSON document for `url`.
    pub fn set_json(&self, url: impl Into<String>, document: serde_json::Value) {
        self.set(url, MockFetch::Json(document));
    }
}

impl MetadataFetcher for MockFetcher {
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, MetadataError> {
        let response = self.responses.lock().get(url).cloned();
        match response {
            Some(MockFetch::Json(document)) => Ok(document),
            Some(MockFetch::Garbage) => {
                Err(MetadataError::NotJson("unexpected token at byte 0".to_string()))
            }
            Some(MockFetch::Unreachable) | None => {
                Err(MetadataError::Unreachable(url.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound_pair(chain: &MockChain, signer: Address) -> (MockEscrowMarket, MockRelicToken) {
        MockWallet::new(chain.clone(), signer).bind_contracts(signer)
    }

    #[tokio::test]
    async fn test_create_requires_approval() {
        let chain = MockChain::new();
        let seller = Address::repeat_byte(1);
        let (escrow, token) = bound_pair(&chain, seller);

        let attempt = escrow
            .create_escrow(token.address(), U256::from(1), U256::from(1), U256::from(10))
            .await;
        assert!(matches!(attempt, Err(MarketError::Reverted { .. })));
        assert!(chain.tx_log().is_empty());

        token
            .set_approval_for_all(escrow.address(), true)
            .await
            .unwrap();
        escrow
            .create_escrow(token.address(), U256::from(1), U256::from(1), U256::from(10))
            .await
            .unwrap();
        assert_eq!(chain.tx_log(), vec!["setApprovalForAll", "createEscrow"]);
    }

    #[tokio::test]
    async fn test_buy_checks_payment_and_vacates() {
        let chain = MockChain::new();
        let seller = Address::repeat_byte(1);
        let buyer = Address::repeat_byte(2);
        let index = chain.seed_listing(seller, U256::from(5), 1, U256::from(100));
        let (escrow, _) = bound_pair(&chain, buyer);

        let wrong = escrow.buy_with_payment(index, U256::from(99)).await;
        assert!(matches!(wrong, Err(MarketError::Reverted { .. })));

        escrow.buy_with_payment(index, U256::from(100)).await.unwrap();
        assert_eq!(escrow.escrow_slot(index).await, SlotRead::Vacant);

        let again = escrow.buy_with_payment(index, U256::from(100)).await;
        assert!(matches!(again, Err(MarketError::Reverted { .. })));
    }

    #[tokio::test]
    async fn test_remove_is_seller_only() {
        let chain = MockChain::new();
        let seller = Address::repeat_byte(1);
        let stranger = Address::repeat_byte(2);
        let index = chain.seed_listing(seller, U256::from(5), 1, U256::from(100));

        let (escrow, _) = bound_pair(&chain, stranger);
        assert!(matches!(
            escrow.remove_escrow(index).await,
            Err(MarketError::Reverted { .. })
        ));

        let (escrow, _) = bound_pair(&chain, seller);
        escrow.remove_escrow(index).await.unwrap();
        assert_eq!(escrow.escrow_slot(index).await, SlotRead::Vacant);
    }

    #[tokio::test]
    async fn test_reads_classify_and_revert() {
        let chain = MockChain::new();
        let seller = Address::repeat_byte(1);
        chain.seed_listing(seller, U256::from(1), 1, U256::from(10));
        chain.seed_listing(seller, U256::from(2), 1, U256::from(10));
        chain.arm_revert_read(1);
        let (escrow, _) = bound_pair(&chain, seller);

        assert!(matches!(escrow.escrow_slot(0).await, SlotRead::Listed(_)));
        assert_eq!(escrow.escrow_slot(1).await, SlotRead::OutOfRange);
        assert_eq!(escrow.escrow_slot(99).await, SlotRead::OutOfRange);
    }

    #[tokio::test]
    async fn test_armed_failure_is_one_shot() {
        let chain = MockChain::new();
        let seller = Address::repeat_byte(1);
        let index = chain.seed_listing(seller, U256::from(1), 1, U256::from(10));
        chain.arm_failure("removeEscrow", MarketError::Dropped);
        let (escrow, _) = bound_pair(&chain, seller);

        assert_eq!(escrow.remove_escrow(index).await, Err(MarketError::Dropped));
        // The failed call mutated nothing.
        assert!(matches!(escrow.escrow_slot(index).await, SlotRead::Listed(_)));
        // The failure was consumed.
        escrow.remove_escrow(index).await.unwrap();
    }
}
