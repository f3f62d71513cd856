//! # escrowpay-auth
//!
//! The **Authorization Verifier**: proves who agreed to what before the
//! payment engine moves any funds.
//!
//! ## Architecture
//!
//! - **`domain`**: [`SigningDomain`] binds digests to (name, version, chain, contract)
//! - **`typed`**: [`TypedMessage`] schemas for `BuyNowInput`, `BidInput`, `AssetTransferResult`
//! - **`verifier`**: [`PaymentVerifier`], a pure predicate over (message, signer, signature)
//! - **`requirement`**: [`Authorization`] / [`AuthorizationRequirement`], the three-party check
//! - **`signer`**: [`PartyKey`], the signing side used by parties and operators
//!
//! Nothing in this crate holds mutable state.

pub mod domain;
pub mod requirement;
pub mod signer;
pub mod typed;
pub mod verifier;

pub use domain::SigningDomain;
pub use requirement::{Authorization, AuthorizationRequirement, PartyConsent};
pub use signer::PartyKey;
pub use typed::{TypedMessage, seller_presence_payload, typed_digest};
pub use verifier::{PaymentVerifier, signature_matches};
