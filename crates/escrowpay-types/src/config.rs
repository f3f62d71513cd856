//! Configuration types for Escrowpay deployments and tenants.

use serde::{Deserialize, Serialize};

use crate::{Address, EscrowError, Rail, Result, constants};

/// Bidding rules for an auction: increment and anti-snipe parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// Minimum raise over the highest bid, in basis points (500 = 5%).
    pub min_increase_bps: u32,
    /// A bid arriving within this many seconds of `ends_at` pushes it
    /// forward by the same amount.
    pub time_to_extend: u64,
    /// Ceiling on how far past its first `ends_at` an auction can run.
    pub extendable_by: u64,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            min_increase_bps: constants::DEFAULT_MIN_INCREASE_BPS,
            time_to_extend: constants::DEFAULT_TIME_TO_EXTEND,
            extendable_by: constants::DEFAULT_EXTENDABLE_BY,
        }
    }
}

impl AuctionConfig {
    /// # Errors
    /// `ZeroMinIncrease` or `ExtendableByTooLarge`.
    pub fn validate(&self) -> Result<()> {
        if self.min_increase_bps == 0 {
            return Err(EscrowError::ZeroMinIncrease);
        }
        if self.extendable_by > constants::MAX_EXTENDABLE_BY {
            return Err(EscrowError::ExtendableByTooLarge {
                extendable_by: self.extendable_by,
                max: constants::MAX_EXTENDABLE_BY,
            });
        }
        Ok(())
    }
}

/// Check a payment window against the protocol bounds (inclusive).
///
/// # Errors
/// `PaymentWindowOutOfRange` outside `[MIN_PAYMENT_WINDOW, MAX_PAYMENT_WINDOW]`.
pub fn validate_payment_window(window: u64) -> Result<()> {
    if !(constants::MIN_PAYMENT_WINDOW..=constants::MAX_PAYMENT_WINDOW).contains(&window) {
        return Err(EscrowError::PaymentWindowOutOfRange {
            window,
            min: constants::MIN_PAYMENT_WINDOW,
            max: constants::MAX_PAYMENT_WINDOW,
        });
    }
    Ok(())
}

/// Resolved per-universe view handed to every state-machine call.
///
/// Built fresh from the registries for each call, so rotations take effect
/// on the next call without touching existing payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantConfig {
    pub operator: Address,
    pub fees_collector: Address,
    pub max_fee_bps: u32,
    pub payment_window: u64,
    pub auction: AuctionConfig,
    /// Credit outbid bidders to their ledger instead of paying them out.
    pub to_local_balance_on_outbid: bool,
    pub seller_registration_required: bool,
}

/// Deployment parameters for one payments instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentsConfig {
    /// Account allowed to call the owner-gated setters.
    pub owner: Address,
    pub rail: Rail,
    /// Chain the signing domain is bound to.
    pub chain_id: u64,
    /// Address of this escrow; also the signing domain's verifying contract.
    pub escrow_account: Address,
    pub default_operator: Address,
    pub default_fees_collector: Address,
    #[serde(default = "default_payment_window")]
    pub payment_window: u64,
    #[serde(default = "default_max_fee_bps")]
    pub default_max_fee_bps: u32,
    #[serde(default)]
    pub default_auction: AuctionConfig,
    #[serde(default = "default_true")]
    pub seller_registration_required: bool,
}

fn default_payment_window() -> u64 {
    constants::DEFAULT_PAYMENT_WINDOW
}

fn default_max_fee_bps() -> u32 {
    constants::DEFAULT_MAX_FEE_BPS
}

fn default_true() -> bool {
    true
}

impl PaymentsConfig {
    /// A config where the owner also acts as default operator and fees
    /// collector until the roles are handed out.
    #[must_use]
    pub fn new(owner: Address, rail: Rail, chain_id: u64, escrow_account: Address) -> Self {
        Self {
            owner,
            rail,
            chain_id,
            escrow_account,
            default_operator: owner,
            default_fees_collector: owner,
            payment_window: constants::DEFAULT_PAYMENT_WINDOW,
            default_max_fee_bps: constants::DEFAULT_MAX_FEE_BPS,
            default_auction: AuctionConfig::default(),
            seller_registration_required: true,
        }
    }

    /// Parse and validate a JSON config.
    ///
    /// # Errors
    /// `Serialization` for malformed JSON, or any `validate` error.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns the first limit the config violates.
    pub fn validate(&self) -> Result<()> {
        validate_payment_window(self.payment_window)?;
        if self.default_max_fee_bps > constants::BPS_DENOMINATOR {
            return Err(EscrowError::FeeAboveHundredPercent {
                fee_bps: self.default_max_fee_bps,
            });
        }
        self.default_auction.validate()?;
        if self.escrow_account.is_zero() {
            return Err(EscrowError::Configuration(
                "escrow_account must be set".to_string(),
            ));
        }
        Ok(())
    }
}
