//! # Listing Synchronization
//!
//! Scans the escrow contract's slot range and publishes a consistent,
//! UI-ready listing set. The set is rebuilt from scratch on every pass and
//! swapped in atomically; readers always see a complete snapshot, never an
//! in-progress scan.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use embergate_chain::{EmberAmount, EscrowSlot, SlotRead};

use crate::bridge::{EscrowMarket, MetadataFetcher, RelicToken};
use crate::metadata::MetadataResolver;
use crate::session::Session;

/// One active listing, enriched for presentation.
///
/// Consumed read-only by the UI; the slot index is the identifier later buy
/// and cancel operations reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingView {
    /// The on-chain slot this listing mirrors.
    pub slot: EscrowSlot,
    /// Human-readable price in the display denomination.
    pub price_display: String,
    /// Resolved image URL, when metadata resolution succeeded.
    pub image: Option<String>,
    /// Whether the session account is the seller.
    pub owned_by_viewer: bool,
}

/// The published listing set and the scanner that rebuilds it.
///
/// `refresh` may be re-entered while a previous pass is still in flight;
/// passes are not serialized. Each pass takes a monotonic scan sequence
/// and only publishes if nothing newer has published first, so a slow
/// stale scan can never clobber a fresh result.
pub struct ListingBoard<F> {
    resolver: MetadataResolver<F>,
    max_slots: u64,
    listings: RwLock<Arc<Vec<ListingView>>>,
    scan_seq: AtomicU64,
    published_seq: AtomicU64,
}

impl<F: MetadataFetcher> ListingBoard<F> {
    /// Creates an empty board scanning at most `max_slots` slots.
    #[must_use]
    pub fn new(resolver: MetadataResolver<F>, max_slots: u64) -> Self {
        Self {
            resolver,
            max_slots,
            listings: RwLock::new(Arc::new(Vec::new())),
            scan_seq: AtomicU64::new(0),
            published_seq: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current listing set.
    #[must_use]
    pub fn listings(&self) -> Arc<Vec<ListingView>> {
        Arc::clone(&self.listings.read())
    }

    /// Rebuilds the listing set from the chain.
    ///
    /// Scans indices `0..max_slots` strictly in increasing order. An
    /// out-of-range read ends the scan on the spot: every later index is
    /// absent by definition, including any that would have read fine. A
    /// vacant read is skipped and the scan continues. Metadata failures
    /// degrade the affected listing to no image and nothing else.
    ///
    /// Returns the number of listings the pass found, whether or not it
    /// won publication.
    pub async fn refresh<E, T>(&self, session: &Session<E, T>) -> usize
    where
        E: EscrowMarket,
        T: RelicToken,
    {
        let seq = self.scan_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let mut fresh = Vec::new();

        for index in 0..self.max_slots {
            match session.escrow.escrow_slot(index).await {
                SlotRead::OutOfRange => {
                    tracing::debug!(index, "slot read out of range, scan ends");
                    break;
                }
                SlotRead::Vacant => continue,
                SlotRead::Listed(slot) => {
                    if !slot.is_active() {
                        continue;
                    }
                    fresh.push(self.enrich(session, slot).await);
                }
            }
        }

        let found = fresh.len();
        self.publish(seq, fresh);
        found
    }

    async fn enrich<E, T>(&self, session: &Session<E, T>, slot: EscrowSlot) -> ListingView
    where
        E: EscrowMarket,
        T: RelicToken,
    {
        let image = match session.token.uri(slot.token_id).await {
            Ok(template) => self.resolver.resolve_image(slot.token_id, &template).await,
            Err(error) => {
                tracing::debug!(token_id = %slot.token_id, error = %error, "uri lookup failed");
                None
            }
        };
        ListingView {
            price_display: EmberAmount::from_wei_u256(slot.price).to_string(),
            image,
            owned_by_viewer: slot.seller == session.address,
            slot,
        }
    }

    /// Publishes a pass unless a newer pass already has.
    fn publish(&self, seq: u64, fresh: Vec<ListingView>) {
        let mut published = self.listings.write();
        let latest = self.published_seq.load(Ordering::SeqCst);
        if seq > latest {
            *published = Arc::new(fresh);
            self.published_seq.store(seq, Ordering::SeqCst);
            tracing::debug!(seq, count = published.len(), "listing set published");
        } else {
            tracing::debug!(seq, latest, "stale scan discarded");
        }
    }
}
