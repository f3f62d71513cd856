//! The `FundingSource` capability: one interface over both payment rails.
//!
//! The payment engine is written once against this trait. Each rail decides
//! how external funds enter the escrow (attached value or allowance pull)
//! and how payouts leave it.
//!
//! Collection is split into a read-only [`FundingSource::plan_collection`]
//! and the [`FundingSource::debit`] that executes the plan, so the engine can
//! finish every check before the first balance moves.

use escrowpay_types::{Address, Rail, Result};

/// Everything a rail needs to decide how to bring in external funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionRequest {
    /// Buyer or bidder being funded.
    pub payer: Address,
    /// Account that sent the call.
    pub sender: Address,
    /// Native value attached to the call.
    pub attached_value: u128,
    /// External share computed by the splitter.
    pub external_needed: u128,
    /// Full amount of the purchase or bid.
    pub amount: u128,
    /// Attached value must equal `external_needed` exactly.
    pub exact: bool,
}

/// A validated plan: pull `pull` from `from`; credit `surplus` to the payer's
/// ledger afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Collection {
    pub from: Address,
    pub pull: u128,
    pub surplus: u128,
}

pub trait FundingSource {
    fn rail(&self) -> Rail;

    /// The escrow's own account on the external currency.
    fn escrow_account(&self) -> Address;

    /// External balance of `owner`.
    fn balance_of(&self, owner: &Address) -> u128;

    /// How much the escrow could pull from `owner` right now.
    fn available_to(&self, owner: &Address) -> u128;

    /// Validate a collection without moving anything.
    ///
    /// # Errors
    /// Economic errors: value out of range, allowance or balance short.
    fn plan_collection(&self, req: &CollectionRequest) -> Result<Collection>;

    /// Move `amount` from `from` into the escrow.
    fn debit(&mut self, from: &Address, amount: u128) -> Result<()>;

    /// Move `amount` from the escrow to `to`.
    fn credit(&mut self, to: &Address, amount: u128) -> Result<()>;

    /// External funds currently held by the escrow.
    fn escrow_holdings(&self) -> u128 {
        self.balance_of(&self.escrow_account())
    }
}
