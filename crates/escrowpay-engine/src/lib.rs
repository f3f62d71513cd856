//! # escrowpay-engine
//!
//! The payment state machine for **Escrowpay**: fixed-price purchases and
//! English auctions over an escrow, settled by an operator's delivery
//! attestation or refunded after a timeout.
//!
//! - [`PaymentsEngine`]: one engine per deployment, generic over the
//!   [`FundingSource`](escrowpay_ledger::FundingSource) rail
//! - [`NativePayments`] / [`TokenPayments`]: the two concrete deployments
//! - [`CallContext`]: sender, clock and attached value of a call
//! - [`auction`]: opening checks and the anti-snipe extension
//! - [`TenantSettings`]: payment window, fee caps, auction configs, outbid
//!   policy, seller registration
//! - [`WithdrawLock`]: per-user opt-out from relayed withdrawals
//!
//! ## Lifecycle
//!
//! ```text
//!  buy_now ─────────────────────────────┐
//!                                       ▼
//!  bid ──▶ AUCTIONING ──(ends_at)──▶ ASSET_TRANSFERRING ──finalize(ok)──▶ PAID
//!           ▲      │                     │
//!           └ bid ─┘                     └──finalize(fail) / refund──▶ REFUNDED
//! ```
//!
//! Proceeds and refunds land in the internal ledger. Users move them out
//! with `withdraw`, or reuse them to fund their next purchase.

pub mod auction;
pub mod bidding;
pub mod book;
pub mod buy_now;
pub mod context;
pub mod engine;
pub mod settings;
pub mod settlement;
pub mod withdraw;
pub mod withdraw_lock;

pub use auction::AuctionOpening;
pub use book::PaymentBook;
pub use context::CallContext;
pub use engine::{NativePayments, PaymentsEngine, TokenPayments};
pub use settings::TenantSettings;
pub use withdraw_lock::WithdrawLock;
