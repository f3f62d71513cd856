//! Identifiers used throughout Escrowpay.
//!
//! Payment identifiers are chosen by the caller (32 opaque bytes), parties
//! are identified by their ed25519 public key, and tenants ("universes") by
//! a plain integer.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// PaymentId
// ---------------------------------------------------------------------------

/// Caller-supplied unique payment identifier.
///
/// The same identifier names a payment across its whole lifecycle; a
/// resolved identifier can never be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PaymentId(pub [u8; 32]);

impl PaymentId {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive an identifier from an arbitrary label.
    ///
    /// `SHA-256("escrowpay:payment_id:v1:" || label)`. Marketplaces use this
    /// to map their own listing keys onto payment identifiers.
    #[must_use]
    pub fn derive(label: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"escrowpay:payment_id:v1:");
        hasher.update(label);
        Self(hasher.finalize().into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pay:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A party's address: the raw ed25519 public key (32 bytes).
///
/// Buyers, sellers, operators, fees collectors, the owner and the escrow
/// account itself are all addresses.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The all-zero address. Never a valid signer.
    pub const ZERO: Self = Self([0u8; 32]);

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse a 64-character hex string (with or without `0x`).
    ///
    /// # Errors
    /// Returns `Configuration` when the string is not 32 hex-encoded bytes.
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw)
            .map_err(|e| crate::EscrowError::Configuration(format!("bad address {s}: {e}")))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            crate::EscrowError::Configuration(format!("address {s} is not 32 bytes"))
        })?;
        Ok(Self(arr))
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// UniverseId
// ---------------------------------------------------------------------------

/// Tenant (marketplace) namespace. Drives operator, fee and auction lookups.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct UniverseId(pub u64);

impl fmt::Display for UniverseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "universe:{}", self.0)
    }
}
