//! Signed inputs: the three typed messages parties and operators sign.

use serde::{Deserialize, Serialize};

use crate::{Address, PaymentId, UniverseId};

/// Fixed-price purchase, signed by the buyer and co-signed by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyNowInput {
    pub payment_id: PaymentId,
    pub amount: u128,
    pub fee_bps: u32,
    pub universe_id: UniverseId,
    /// Last instant (inclusive) at which the input may be submitted.
    pub deadline: u64,
    pub buyer: Address,
    pub seller: Address,
}

/// Auction bid, signed by the bidder and co-signed by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidInput {
    pub payment_id: PaymentId,
    /// Requested close time. Binding on the first bid only.
    pub ends_at: u64,
    pub bid_amount: u128,
    pub fee_bps: u32,
    pub universe_id: UniverseId,
    pub deadline: u64,
    pub bidder: Address,
    pub seller: Address,
}

/// Operator attestation of the off-chain asset transfer outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTransferResult {
    pub payment_id: PaymentId,
    pub was_successful: bool,
}

impl BidInput {
    /// View the bid as a purchase at the bid amount. Used by validation
    /// shared with the BuyNow path.
    #[must_use]
    pub fn as_purchase(&self) -> BuyNowInput {
        BuyNowInput {
            payment_id: self.payment_id,
            amount: self.bid_amount,
            fee_bps: self.fee_bps,
            universe_id: self.universe_id,
            deadline: self.deadline,
            buyer: self.bidder,
            seller: self.seller,
        }
    }
}
