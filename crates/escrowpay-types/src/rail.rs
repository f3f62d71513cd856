//! Payment rails: which currency a deployment escrows.

use serde::{Deserialize, Serialize};

use crate::constants::{NATIVE_DOMAIN_NAME, TOKEN_DOMAIN_NAME};

/// The currency a payments deployment is denominated in.
///
/// The two rails share one state machine but differ in a few documented
/// places, captured by the methods below.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rail {
    /// Native coin. External funds arrive as value attached to the call.
    #[default]
    Native,
    /// Fungible token. External funds are pulled through an allowance.
    Token,
}

impl Rail {
    /// Signing-domain name, so a signature for one rail never verifies on
    /// the other.
    #[must_use]
    pub fn domain_name(&self) -> &'static str {
        match self {
            Self::Native => NATIVE_DOMAIN_NAME,
            Self::Token => TOKEN_DOMAIN_NAME,
        }
    }

    /// Whether later bids must repeat the auction's fee and stay within its
    /// extension ceiling. The token rail leaves this to the off-chain layer.
    #[must_use]
    pub fn enforces_auction_consistency(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// Whether entry points require the seller presence proof.
    #[must_use]
    pub fn requires_seller_signature(&self) -> bool {
        matches!(self, Self::Token)
    }
}

impl std::fmt::Display for Rail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => write!(f, "NATIVE"),
            Self::Token => write!(f, "TOKEN"),
        }
    }
}
