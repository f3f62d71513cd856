//! Signing side of the protocol: what buyers, bidders, sellers and
//! operators run to produce the signatures the verifier checks.

use ed25519_dalek::{Signer, SigningKey};
use escrowpay_types::{Address, PaymentId, Signature};

use crate::SigningDomain;
use crate::typed::{TypedMessage, seller_presence_payload, typed_digest};

/// An ed25519 keypair whose public half is the party's [`Address`].
#[derive(Clone)]
pub struct PartyKey {
    key: SigningKey,
}

impl PartyKey {
    #[must_use]
    pub fn from_secret(secret: [u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(&secret),
        }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        Address::from_bytes(self.key.verifying_key().to_bytes())
    }

    /// Sign the typed digest of `msg` under `domain`.
    #[must_use]
    pub fn sign_typed<M: TypedMessage>(&self, domain: &SigningDomain, msg: &M) -> Signature {
        self.key.sign(&typed_digest(domain, msg))
    }

    /// Seller presence proof for `payment_id`.
    #[must_use]
    pub fn sign_seller_presence(&self, payment_id: &PaymentId) -> Signature {
        self.key.sign(&seller_presence_payload(payment_id))
    }
}

impl std::fmt::Debug for PartyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartyKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Random keys for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl PartyKey {
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut rand::rngs::OsRng),
        }
    }
}
