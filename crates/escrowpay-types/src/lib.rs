//! # escrowpay-types
//!
//! Shared types, errors, and configuration for the **Escrowpay** payments
//! protocol.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`PaymentId`], [`Address`], [`UniverseId`]
//! - **Payment model**: [`Payment`], [`PaymentState`], [`AuctionData`]
//! - **Signed inputs**: [`BuyNowInput`], [`BidInput`], [`AssetTransferResult`]
//! - **Rails**: [`Rail`] (native coin or token)
//! - **Configuration**: [`PaymentsConfig`], [`TenantConfig`], [`AuctionConfig`]
//! - **Events**: [`PaymentEvent`]
//! - **Fee math**: [`compute_fee_amount`], [`split_proceeds`], [`meets_min_increase`]
//! - **Errors**: [`EscrowError`] with `EP_ERR_` prefix codes
//! - **Constants**: protocol limits and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod fees;
pub mod ids;
pub mod input;
pub mod payment;
pub mod rail;

pub use config::*;
pub use error::*;
pub use event::*;
pub use fees::*;
pub use ids::*;
pub use input::*;
pub use payment::*;
pub use rail::*;

pub use ed25519_dalek::Signature;

// Constants are accessed via `escrowpay_types::constants::FOO`
// (not re-exported to avoid name collisions).
