//! Funding splitter: how much of a required amount comes from the ledger
//! and how much must be pulled from outside.

use serde::{Deserialize, Serialize};

/// Ledger share and external share of a required amount.
///
/// Always `local_funds + external_funds == required`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingSplit {
    pub local_funds: u128,
    pub external_funds: u128,
}

impl FundingSplit {
    #[must_use]
    pub fn required(&self) -> u128 {
        self.local_funds + self.external_funds
    }
}

/// Funding for a bid, which may only need the delta over the bidder's own
/// standing bid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionFundingSplit {
    pub split: FundingSplit,
    /// The bidder already holds the highest bid on this auction.
    pub is_same_bidder: bool,
}

/// `local = min(ledger_balance, required)`, `external = required - local`.
#[must_use]
pub fn split_funding(ledger_balance: u128, required: u128) -> FundingSplit {
    let local_funds = ledger_balance.min(required);
    FundingSplit {
        local_funds,
        external_funds: required - local_funds,
    }
}
