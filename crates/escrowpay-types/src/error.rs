//! Error types for the Escrowpay payments protocol.
//!
//! All errors use the `EP_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by failure class:
//! - 1xx: Authorization errors (signatures, parties, callers)
//! - 2xx: Temporal errors (deadlines, auction end times, windows)
//! - 3xx: State errors (action invalid for the current payment state)
//! - 4xx: Economic errors (amounts, fees, funding, withdrawals)
//! - 5xx: Configuration errors (auction config, margins)
//! - 9xx: General / internal errors
//!
//! Every rejection is synchronous and leaves no partial effects behind.

use thiserror::Error;

use crate::{Address, PaymentId, PaymentState, UniverseId};

/// Central error enum for all Escrowpay operations.
#[derive(Debug, Error)]
pub enum EscrowError {
    // =================================================================
    // Authorization Errors (1xx)
    // =================================================================
    /// The buyer did not sign this BuyNow input.
    #[error("EP_ERR_100: incorrect buyer signature")]
    IncorrectBuyerSignature,

    /// The bidder did not sign this Bid input.
    #[error("EP_ERR_101: incorrect bidder signature")]
    IncorrectBidderSignature,

    /// The tenant's current operator did not sign the input.
    #[error("EP_ERR_102: incorrect operator signature")]
    IncorrectOperatorSignature,

    /// The seller presence proof does not verify.
    #[error("EP_ERR_103: incorrect seller signature")]
    IncorrectSellerSignature,

    /// This rail requires a seller presence proof and none was supplied.
    #[error("EP_ERR_104: seller signature required")]
    MissingSellerSignature,

    /// The operator coincides with the buyer or the seller.
    #[error("EP_ERR_105: operator must be an observer")]
    OperatorNotObserver,

    /// Buyer and seller are the same address.
    #[error("EP_ERR_106: buyer and seller cannot coincide")]
    BuyerSellerCoincide,

    /// A direct BuyNow call was sent by someone other than the buyer.
    #[error("EP_ERR_107: only buyer can execute this function")]
    OnlyBuyer,

    /// A direct Bid call was sent by someone other than the bidder.
    #[error("EP_ERR_108: only bidder can execute this function")]
    OnlyBidder,

    /// An asset transfer result was not signed by the current operator.
    #[error("EP_ERR_109: only the operator can sign an assetTransferResult")]
    OnlyOperatorCanSignResult,

    /// A third party tried to withdraw for a user who opted out of relays.
    #[error("EP_ERR_110: tx sender not authorized to withdraw on recipients behalf: {user}")]
    NotAuthorizedToWithdraw { user: Address },

    /// An owner-gated setter was called by someone else.
    #[error("EP_ERR_111: caller is not the owner: {caller}")]
    NotOwner { caller: Address },

    /// The tenant requires registered sellers and this one is not.
    #[error("EP_ERR_112: seller not registered: {0}")]
    SellerNotRegistered(Address),

    /// `register_as_seller` called twice by the same address.
    #[error("EP_ERR_113: seller already registered: {0}")]
    SellerAlreadyRegistered(Address),

    // =================================================================
    // Temporal Errors (2xx)
    // =================================================================
    /// The signed input's deadline has passed.
    #[error("EP_ERR_200: payment deadline expired (deadline {deadline}, now {now})")]
    DeadlineExpired { deadline: u64, now: u64 },

    /// An auction was requested to end before the current time.
    #[error("EP_ERR_201: endsAt cannot be in the past (endsAt {ends_at}, now {now})")]
    EndsAtInPast { ends_at: u64, now: u64 },

    /// An auction was requested to end too far in the future.
    #[error("EP_ERR_202: endsAt exceeds maximum auction duration (endsAt {ends_at}, max {max})")]
    EndsAtTooFar { ends_at: u64, max: u64 },

    /// A later bid carries an endsAt past the auction's extension ceiling.
    #[error("EP_ERR_203: endsAt does not correspond to on-going auction data")]
    EndsAtMismatch,

    /// Payment window outside the configured bounds.
    #[error("EP_ERR_204: payment window {window}s outside limits [{min}s, {max}s]")]
    PaymentWindowOutOfRange { window: u64, min: u64, max: u64 },

    /// Refund requested before the payment expired.
    #[error("EP_ERR_205: payment does not accept refunds at this stage: {0}")]
    RefundNotAccepted(PaymentId),

    // =================================================================
    // State Errors (3xx)
    // =================================================================
    /// BuyNow requested for an identifier that is already in use.
    #[error("EP_ERR_300: payment in incorrect current state: {state}")]
    IncorrectPaymentState { state: PaymentState },

    /// A bid arrived for a payment that is neither fresh nor auctioning.
    #[error("EP_ERR_301: bids are only accepted if state is either NOT_STARTED or AUCTIONING, got {state}")]
    BidsNotAccepted { state: PaymentState },

    /// Finalize requested for a payment that is not awaiting asset transfer.
    #[error("EP_ERR_302: payment not initially in asset transferring state: {state}")]
    NotAssetTransferring { state: PaymentState },

    /// A transition that the payment state machine forbids.
    #[error("EP_ERR_303: invalid transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: PaymentId,
        from: PaymentState,
        to: PaymentState,
    },

    /// A later bid names a seller other than the auction's.
    #[error("EP_ERR_304: seller does not match on-going auction seller ({offered} != {stored})")]
    SellerMismatch { offered: Address, stored: Address },

    /// A later bid names a universe other than the auction's.
    #[error("EP_ERR_305: universe does not match on-going auction universe ({offered} != {stored})")]
    UniverseMismatch {
        offered: UniverseId,
        stored: UniverseId,
    },

    // =================================================================
    // Economic Errors (4xx)
    // =================================================================
    /// BuyNow amount is zero.
    #[error("EP_ERR_400: payment amount cannot be zero")]
    ZeroAmount,

    /// Bid amount is zero.
    #[error("EP_ERR_401: bid amount cannot be 0")]
    ZeroBid,

    /// Requested fee exceeds the tenant's cap.
    #[error("EP_ERR_402: fee cannot be larger than maxFeeBPS ({fee_bps} > {max_fee_bps})")]
    FeeAboveMax { fee_bps: u32, max_fee_bps: u32 },

    /// A fee cap was configured above 100%.
    #[error("EP_ERR_403: fee cannot be larger than 100 percent ({fee_bps} bps)")]
    FeeAboveHundredPercent { fee_bps: u32 },

    /// A later bid carries a fee different from the running auction.
    #[error("EP_ERR_404: fee does not match on-going auction fee ({offered} != {locked})")]
    FeeMismatch { offered: u32, locked: u32 },

    /// A later bid does not beat the highest bid by the minimum increment.
    #[error(
        "EP_ERR_405: bid needs to be larger than previous bid by a certain percentage \
         (previous {previous}, offered {offered}, min increase {min_increase_bps} bps)"
    )]
    BidIncrementTooSmall {
        previous: u128,
        offered: u128,
        min_increase_bps: u32,
    },

    /// Attached native value exceeds the payment amount.
    #[error("EP_ERR_406: new funds provided must be less than bid amount ({provided} > {amount})")]
    FundsAboveAmount { provided: u128, amount: u128 },

    /// Attached native value does not cover the external share.
    #[error("EP_ERR_407: new funds provided are not within required range ({provided} < {required})")]
    FundsOutOfRange { provided: u128, required: u128 },

    /// A bidder raising their own bid attached more than the increment.
    #[error("EP_ERR_408: new funds provided must match the required increment ({provided} != {required})")]
    FundsMustMatchIncrement { provided: u128, required: u128 },

    /// Token allowance granted to the escrow does not cover the pull.
    #[error("EP_ERR_409: insufficient allowance: need {needed}, allowed {allowance}")]
    InsufficientAllowance { needed: u128, allowance: u128 },

    /// External balance does not cover the pull.
    #[error("EP_ERR_410: transfer amount exceeds balance: need {needed}, have {available}")]
    InsufficientExternalBalance { needed: u128, available: u128 },

    /// Attached value on a rail that pulls funds by allowance.
    #[error("EP_ERR_411: rail does not accept attached value ({value})")]
    UnexpectedValue { value: u128 },

    /// Withdrawal of an empty ledger balance.
    #[error("EP_ERR_412: cannot withdraw zero amount")]
    ZeroWithdrawal,

    /// Withdrawal larger than the ledger balance.
    #[error("EP_ERR_413: not enough balance to withdraw specified amount: requested {requested}, available {available}")]
    WithdrawalExceedsBalance { requested: u128, available: u128 },

    // =================================================================
    // Configuration Errors (5xx)
    // =================================================================
    /// Auction config with a zero minimum increase.
    #[error("EP_ERR_500: minIncreasePercentage must be non-zero")]
    ZeroMinIncrease,

    /// Auction config whose extension ceiling is too large.
    #[error("EP_ERR_501: extendableBy exceeds maximum allowed ({extendable_by}s > {max}s)")]
    ExtendableByTooLarge { extendable_by: u64, max: u64 },

    /// The auction could be extended too close to its payment expiration.
    #[error("EP_ERR_502: cannot start auction that is extendable too close to expiration time")]
    AuctionTooCloseToExpiration,

    /// Structurally invalid configuration (file, missing fields, etc.).
    #[error("EP_ERR_503: Configuration error: {0}")]
    Configuration(String),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Amount arithmetic left the representable range.
    #[error("EP_ERR_900: arithmetic overflow")]
    ArithmeticOverflow,

    /// Escrow holdings do not match ledger plus in-flight payments.
    #[error("EP_ERR_901: solvency invariant violated: {reason}")]
    SolvencyViolation { reason: String },

    /// Serialization / deserialization error.
    #[error("EP_ERR_902: Serialization error: {0}")]
    Serialization(String),

    /// Unrecoverable internal error.
    #[error("EP_ERR_999: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, EscrowError>;

impl From<serde_json::Error> for EscrowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
