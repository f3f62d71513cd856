//! Events emitted by the payments engine.
//!
//! Every config change carries the previous value alongside the new one so
//! that indexers can reconstruct history from the event log alone.

use serde::{Deserialize, Serialize};

use crate::{Address, AuctionConfig, PaymentId, UniverseId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentEvent {
    // --- Payment lifecycle ---
    BuyNow {
        payment_id: PaymentId,
        buyer: Address,
        seller: Address,
    },
    Bid {
        payment_id: PaymentId,
        bidder: Address,
        seller: Address,
        bid_amount: u128,
        ends_at: u64,
    },
    Paid {
        payment_id: PaymentId,
    },
    BuyerRefunded {
        payment_id: PaymentId,
        buyer: Address,
    },
    Withdraw {
        user: Address,
        amount: u128,
    },
    NewSeller {
        seller: Address,
    },

    // --- Role registry ---
    DefaultOperator {
        operator: Address,
        prev_operator: Address,
    },
    UniverseOperator {
        universe_id: UniverseId,
        operator: Address,
        prev_operator: Address,
    },
    DefaultFeesCollector {
        fees_collector: Address,
        prev_fees_collector: Address,
    },
    UniverseFeesCollector {
        universe_id: UniverseId,
        fees_collector: Address,
        prev_fees_collector: Address,
    },

    // --- Tenant settings ---
    PaymentWindow {
        window: u64,
        prev_window: u64,
    },
    DefaultMaxFee {
        max_fee_bps: u32,
        prev_max_fee_bps: u32,
    },
    UniverseMaxFee {
        universe_id: UniverseId,
        max_fee_bps: u32,
        prev_max_fee_bps: u32,
    },
    DefaultAuctionConfig {
        config: AuctionConfig,
        prev_config: AuctionConfig,
    },
    UniverseAuctionConfig {
        universe_id: UniverseId,
        config: AuctionConfig,
        prev_config: AuctionConfig,
    },
    ToLocalBalanceOnOutBid {
        universe_id: UniverseId,
        to_local_balance_on_outbid: bool,
    },
    SellerRegistrationRequired {
        required: bool,
    },
    OnlyUserCanWithdraw {
        user: Address,
        only_user_can_withdraw: bool,
    },
    VerifierChanged {
        verifying_contract: Address,
        prev_verifying_contract: Address,
    },
}

impl PaymentEvent {
    /// The payment this event belongs to, if any.
    #[must_use]
    pub fn payment_id(&self) -> Option<PaymentId> {
        match self {
            Self::BuyNow { payment_id, .. }
            | Self::Bid { payment_id, .. }
            | Self::Paid { payment_id }
            | Self::BuyerRefunded { payment_id, .. } => Some(*payment_id),
            _ => None,
        }
    }

    /// Short event name as it appears in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::BuyNow { .. } => "BuyNow",
            Self::Bid { .. } => "Bid",
            Self::Paid { .. } => "Paid",
            Self::BuyerRefunded { .. } => "BuyerRefunded",
            Self::Withdraw { .. } => "Withdraw",
            Self::NewSeller { .. } => "NewSeller",
            Self::DefaultOperator { .. } => "DefaultOperator",
            Self::UniverseOperator { .. } => "UniverseOperator",
            Self::DefaultFeesCollector { .. } => "DefaultFeesCollector",
            Self::UniverseFeesCollector { .. } => "UniverseFeesCollector",
            Self::PaymentWindow { .. } => "PaymentWindow",
            Self::DefaultMaxFee { .. } => "DefaultMaxFee",
            Self::UniverseMaxFee { .. } => "UniverseMaxFee",
            Self::DefaultAuctionConfig { .. } => "DefaultAuctionConfig",
            Self::UniverseAuctionConfig { .. } => "UniverseAuctionConfig",
            Self::ToLocalBalanceOnOutBid { .. } => "ToLocalBalanceOnOutBid",
            Self::SellerRegistrationRequired { .. } => "SellerRegistrationRequired",
            Self::OnlyUserCanWithdraw { .. } => "OnlyUserCanWithdraw",
            Self::VerifierChanged { .. } => "VerifierChanged",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_events_expose_payment_id() {
        let id = PaymentId::from_bytes([4; 32]);
        assert_eq!(PaymentEvent::Paid { payment_id: id }.payment_id(), Some(id));
        let w = PaymentEvent::Withdraw {
            user: Address::ZERO,
            amount: 1,
        };
        assert_eq!(w.payment_id(), None);
        assert_eq!(w.name(), "Withdraw");
    }
}
