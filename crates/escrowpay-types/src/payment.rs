//! # Payment: the escrowed unit of value
//!
//! One `Payment` exists per caller-supplied [`PaymentId`]. It covers both
//! products: a fixed-price BuyNow and an English auction.
//!
//! ## State Machine
//!
//! ```text
//!                  first bid   ┌────────────┐  now >= ends_at
//!        ┌────────────────────▶│ AUCTIONING ├──────────────────┐
//!        │                     └─────┬──────┘                  │
//!  ┌─────┴───────┐                   │ later bids              ▼
//!  │ NOT_STARTED │                   └──▶ (stays)   ┌────────────────────┐
//!  └─────┬───────┘                                  │ ASSET_TRANSFERRING │
//!        │ buy now                                  └───┬────────────┬───┘
//!        └─────────────────────────────────────────────▶│            │
//!                                          success      ▼            ▼ failure / timeout
//!                                                  ┌──────┐    ┌──────────┐
//!                                                  │ PAID │    │ REFUNDED │
//!                                                  └──────┘    └──────────┘
//! ```
//!
//! Transitions are **monotonic**. `PAID` and `REFUNDED` are terminal.
//!
//! The `AUCTIONING → ASSET_TRANSFERRING` edge is taken lazily: reads go
//! through [`Payment::state_at`], which reports the derived state as soon
//! as the clock passes `ends_at`, and the stored state catches up on the
//! next mutating call via [`Payment::materialize`]. "Failed" is never
//! stored either: it is [`Payment::accepts_refunds`].

use serde::{Deserialize, Serialize};

use crate::{Address, EscrowError, PaymentId, Result, UniverseId};

/// The lifecycle state of a payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentState {
    /// The identifier has never been used.
    #[default]
    NotStarted,
    /// Funds are escrowed; waiting for the operator's delivery attestation.
    AssetTransferring,
    /// The buyer got their funds back. **Terminal.**
    Refunded,
    /// Seller and fees collector were credited. **Terminal.**
    Paid,
    /// An auction is running and accepting bids.
    Auctioning,
}

impl PaymentState {
    /// Can a payment in this state move to `target`?
    ///
    /// `AUCTIONING → AUCTIONING` is the self-loop taken by every later bid.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::NotStarted, Self::Auctioning | Self::AssetTransferring)
                | (Self::Auctioning, Self::Auctioning | Self::AssetTransferring)
                | (Self::AssetTransferring, Self::Paid | Self::Refunded)
        )
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Refunded)
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NOT_STARTED"),
            Self::AssetTransferring => write!(f, "ASSET_TRANSFERRING"),
            Self::Refunded => write!(f, "REFUNDED"),
            Self::Paid => write!(f, "PAID"),
            Self::Auctioning => write!(f, "AUCTIONING"),
        }
    }
}

/// Auction-only timing data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionData {
    /// Current close time. Pushed forward by late bids.
    pub ends_at: u64,
    /// Ceiling past which `ends_at` cannot be pushed.
    pub extendable_until: u64,
}

/// A payment record.
///
/// `operator` and `fees_collector` are snapshots taken at creation. Finalize
/// still checks the universe's *current* operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    /// Stored state. Use [`Payment::state_at`] for reads.
    pub state: PaymentState,
    /// Buyer, or current highest bidder.
    pub buyer: Address,
    pub seller: Address,
    pub operator: Address,
    pub fees_collector: Address,
    pub universe_id: UniverseId,
    /// Fixed price, or current highest bid.
    pub amount: u128,
    /// Locked when the payment starts.
    pub fee_bps: u32,
    /// After this instant an unresolved payment becomes refundable.
    pub expiration_time: u64,
    /// Present for auctions only.
    pub auction: Option<AuctionData>,
}

impl Payment {
    /// State as observed at `now`, without writing anything.
    #[must_use]
    pub fn state_at(&self, now: u64) -> PaymentState {
        match (self.state, self.auction) {
            (PaymentState::Auctioning, Some(auction)) if now >= auction.ends_at => {
                PaymentState::AssetTransferring
            }
            (state, _) => state,
        }
    }

    /// Write the derived state back into storage. Returns `true` if the
    /// stored state changed.
    pub fn materialize(&mut self, now: u64) -> bool {
        let derived = self.state_at(now);
        if derived == self.state {
            return false;
        }
        self.state = derived;
        true
    }

    /// `true` once an unresolved payment has passed its expiration time.
    #[must_use]
    pub fn accepts_refunds(&self, now: u64) -> bool {
        self.state_at(now) == PaymentState::AssetTransferring && now >= self.expiration_time
    }

    /// Attempt a stored-state transition.
    ///
    /// # Errors
    /// Returns `InvalidTransition` if the state machine forbids it.
    pub fn transition(&mut self, target: PaymentState) -> Result<()> {
        if !self.state.can_transition_to(target) {
            return Err(EscrowError::InvalidTransition {
                id: self.id,
                from: self.state,
                to: target,
            });
        }
        self.state = target;
        Ok(())
    }
}

/// Dummy payment for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Payment {
    /// A BuyNow payment in `ASSET_TRANSFERRING` with random parties.
    pub fn dummy(amount: u128, fee_bps: u32, expiration_time: u64) -> Self {
        Self {
            id: PaymentId::from_bytes(rand::random()),
            state: PaymentState::AssetTransferring,
            buyer: Address::from_bytes(rand::random()),
            seller: Address::from_bytes(rand::random()),
            operator: Address::from_bytes(rand::random()),
            fees_collector: Address::from_bytes(rand::random()),
            universe_id: UniverseId(0),
            amount,
            fee_bps,
            expiration_time,
            auction: None,
        }
    }
}
