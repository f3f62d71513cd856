//! Signature verification against claimed signers.
//!
//! Addresses are ed25519 verifying keys, so "recover the signer and compare
//! it with the claimed address" becomes "verify the signature under the
//! claimed address". Both answer the same yes/no question. Verification is
//! a pure predicate and never mutates anything.

use ed25519_dalek::VerifyingKey;
use escrowpay_types::{
    Address, AssetTransferResult, BidInput, BuyNowInput, PaymentId, Signature,
};
use sha2::{Digest, Sha256};

use crate::typed::{TypedMessage, seller_presence_payload};
use crate::SigningDomain;

/// `true` iff `sig` is a valid signature of `message` by `signer`.
///
/// Malformed keys (including the zero address) never verify.
#[must_use]
pub fn signature_matches(message: &[u8], signer: &Address, sig: &Signature) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(signer.as_bytes()) else {
        return false;
    };
    key.verify_strict(message, sig).is_ok()
}

/// Verifies typed messages for one signing domain.
#[derive(Debug, Clone)]
pub struct PaymentVerifier {
    domain: SigningDomain,
    separator: [u8; 32],
}

impl PaymentVerifier {
    #[must_use]
    pub fn new(domain: SigningDomain) -> Self {
        let separator = domain.separator();
        Self { domain, separator }
    }

    #[must_use]
    pub fn domain(&self) -> &SigningDomain {
        &self.domain
    }

    /// Digest of `msg` under this verifier's domain.
    #[must_use]
    pub fn digest<M: TypedMessage>(&self, msg: &M) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update([0x19, 0x01]);
        hasher.update(self.separator);
        hasher.update(msg.struct_hash());
        hasher.finalize().into()
    }

    #[must_use]
    pub fn is_signed_by<M: TypedMessage>(&self, msg: &M, signer: &Address, sig: &Signature) -> bool {
        signature_matches(&self.digest(msg), signer, sig)
    }

    #[must_use]
    pub fn verify_buy_now(&self, input: &BuyNowInput, signer: &Address, sig: &Signature) -> bool {
        self.is_signed_by(input, signer, sig)
    }

    #[must_use]
    pub fn verify_bid(&self, input: &BidInput, signer: &Address, sig: &Signature) -> bool {
        self.is_signed_by(input, signer, sig)
    }

    #[must_use]
    pub fn verify_asset_transfer_result(
        &self,
        result: &AssetTransferResult,
        signer: &Address,
        sig: &Signature,
    ) -> bool {
        self.is_signed_by(result, signer, sig)
    }

    /// Seller presence proofs are not domain-bound.
    #[must_use]
    pub fn verify_seller_presence(
        &self,
        payment_id: &PaymentId,
        seller: &Address,
        sig: &Signature,
    ) -> bool {
        signature_matches(&seller_presence_payload(payment_id), seller, sig)
    }
}
