//! Typed structured-data hashing.
//!
//! ```text
//! type_hash   = SHA-256(type signature)
//! struct_hash = SHA-256(type_hash || field_0 || field_1 || ...)
//! digest      = SHA-256(0x19 || 0x01 || domain_separator || struct_hash)
//! ```
//!
//! Every field is encoded as one 32-byte big-endian word, so no two
//! distinct messages of the same type share an encoding.

use escrowpay_types::{Address, AssetTransferResult, BidInput, BuyNowInput, PaymentId};
use sha2::{Digest, Sha256};

use crate::SigningDomain;

/// A message with a fixed type signature and fixed-width field encoding.
pub trait TypedMessage {
    /// Solidity-style type signature, hashed into every struct hash.
    const TYPE_SIGNATURE: &'static str;

    /// Append every field, in type-signature order, one word each.
    fn encode_fields(&self, out: &mut Vec<u8>);

    fn struct_hash(&self) -> [u8; 32] {
        let mut buf = Vec::with_capacity(9 * 32);
        buf.extend_from_slice(&type_hash(Self::TYPE_SIGNATURE));
        self.encode_fields(&mut buf);
        Sha256::digest(&buf).into()
    }
}

/// Final digest a party signs for `msg` under `domain`.
#[must_use]
pub fn typed_digest<M: TypedMessage>(domain: &SigningDomain, msg: &M) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update([0x19, 0x01]);
    hasher.update(domain.separator());
    hasher.update(msg.struct_hash());
    hasher.finalize().into()
}

pub(crate) fn type_hash(signature: &str) -> [u8; 32] {
    Sha256::digest(signature.as_bytes()).into()
}

// ---------------------------------------------------------------------------
// Word encoders
// ---------------------------------------------------------------------------

pub(crate) fn put_u128(out: &mut Vec<u8>, v: u128) {
    out.extend_from_slice(&[0u8; 16]);
    out.extend_from_slice(&v.to_be_bytes());
}

pub(crate) fn put_u64(out: &mut Vec<u8>, v: u64) {
    put_u128(out, u128::from(v));
}

pub(crate) fn put_bool(out: &mut Vec<u8>, v: bool) {
    put_u128(out, u128::from(v));
}

pub(crate) fn put_address(out: &mut Vec<u8>, a: &Address) {
    out.extend_from_slice(a.as_bytes());
}

pub(crate) fn put_payment_id(out: &mut Vec<u8>, id: &PaymentId) {
    out.extend_from_slice(id.as_bytes());
}

// ---------------------------------------------------------------------------
// Message schemas
// ---------------------------------------------------------------------------

impl TypedMessage for BuyNowInput {
    const TYPE_SIGNATURE: &'static str = "BuyNowInput(bytes32 paymentId,uint256 amount,\
        uint256 feeBPS,uint256 universeId,uint256 deadline,address buyer,address seller)";

    fn encode_fields(&self, out: &mut Vec<u8>) {
        put_payment_id(out, &self.payment_id);
        put_u128(out, self.amount);
        put_u64(out, u64::from(self.fee_bps));
        put_u64(out, self.universe_id.0);
        put_u64(out, self.deadline);
        put_address(out, &self.buyer);
        put_address(out, &self.seller);
    }
}

impl TypedMessage for BidInput {
    const TYPE_SIGNATURE: &'static str = "BidInput(bytes32 paymentId,uint256 endsAt,\
        uint256 bidAmount,uint256 feeBPS,uint256 universeId,uint256 deadline,\
        address bidder,address seller)";

    fn encode_fields(&self, out: &mut Vec<u8>) {
        put_payment_id(out, &self.payment_id);
        put_u64(out, self.ends_at);
        put_u128(out, self.bid_amount);
        put_u64(out, u64::from(self.fee_bps));
        put_u64(out, self.universe_id.0);
        put_u64(out, self.deadline);
        put_address(out, &self.bidder);
        put_address(out, &self.seller);
    }
}

impl TypedMessage for AssetTransferResult {
    const TYPE_SIGNATURE: &'static str = "AssetTransferResult(bytes32 paymentId,bool wasSuccessful)";

    fn encode_fields(&self, out: &mut Vec<u8>) {
        put_payment_id(out, &self.payment_id);
        put_bool(out, self.was_successful);
    }
}

/// Payload for the lightweight seller presence proof.
///
/// Format: `"escrowpay:seller:v1:" || payment_id`. Not domain-typed.
#[must_use]
pub fn seller_presence_payload(payment_id: &PaymentId) -> Vec<u8> {
    let mut payload = Vec::with_capacity(20 + 32);
    payload.extend_from_slice(b"escrowpay:seller:v1:");
    payload.extend_from_slice(payment_id.as_bytes());
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use escrowpay_types::{Rail, UniverseId};

    fn buy_now() -> BuyNowInput {
        BuyNowInput {
            payment_id: PaymentId::from_bytes([1; 32]),
            amount: 300,
            fee_bps: 500,
            universe_id: UniverseId(1),
            deadline: 1_000,
            buyer: Address::from_bytes([2; 32]),
            seller: Address::from_bytes([3; 32]),
        }
    }

    fn domain() -> SigningDomain {
        SigningDomain::for_rail(Rail::Native, 1337, Address::from_bytes([9; 32]))
    }

    #[test]
    fn words_are_32_bytes() {
        let mut out = Vec::new();
        put_u128(&mut out, 1);
        put_u64(&mut out, 2);
        put_bool(&mut out, true);
        assert_eq!(out.len(), 96);
        assert_eq!(out[31], 1);
        assert_eq!(out[63], 2);
        assert_eq!(out[95], 1);
    }

    #[test]
    fn buy_now_encodes_seven_words() {
        let mut out = Vec::new();
        buy_now().encode_fields(&mut out);
        assert_eq!(out.len(), 7 * 32);
    }

    #[test]
    fn any_field_change_changes_digest() {
        let base = typed_digest(&domain(), &buy_now());
        let mut other = buy_now();
        other.amount = 301;
        assert_ne!(typed_digest(&domain(), &other), base);
        let mut other = buy_now();
        other.fee_bps = 501;
        assert_ne!(typed_digest(&domain(), &other), base);
        let mut other = buy_now();
        other.seller = Address::from_bytes([4; 32]);
        assert_ne!(typed_digest(&domain(), &other), base);
    }

    #[test]
    fn schemas_do_not_collide() {
        let result = AssetTransferResult {
            payment_id: PaymentId::from_bytes([1; 32]),
            was_successful: true,
        };
        let failed = AssetTransferResult {
            was_successful: false,
            ..result
        };
        assert_ne!(result.struct_hash(), failed.struct_hash());
        assert_ne!(
            type_hash(BuyNowInput::TYPE_SIGNATURE),
            type_hash(BidInput::TYPE_SIGNATURE)
        );
    }

    #[test]
    fn seller_payload_is_prefixed() {
        let id = PaymentId::from_bytes([5; 32]);
        let p = seller_presence_payload(&id);
        assert!(p.starts_with(b"escrowpay:seller:v1:"));
        assert_eq!(p.len(), 52);
    }
}
