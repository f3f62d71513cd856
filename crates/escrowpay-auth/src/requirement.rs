//! Three-party authorization for payment entry points.
//!
//! Every purchase or bid needs consent from the paying party, a co-signature
//! from the universe's current operator, and (on some rails) a seller
//! presence proof. Each entry point states which proofs it carries through
//! an [`Authorization`], and the engine states what it demands through an
//! [`AuthorizationRequirement`].

use escrowpay_types::{
    Address, AssetTransferResult, BidInput, BuyNowInput, EscrowError, PaymentId, Result,
    Signature,
};

use crate::PaymentVerifier;
use crate::typed::TypedMessage;

/// How the paying party consents.
#[derive(Debug, Clone, Copy)]
pub enum PartyConsent<'a> {
    /// The party sent the call itself.
    Caller,
    /// A relayer sent the call with the party's typed signature.
    Signed(&'a Signature),
}

/// Proofs supplied with a purchase or bid.
#[derive(Debug, Clone, Copy)]
pub struct Authorization<'a> {
    pub party: PartyConsent<'a>,
    pub operator: &'a Signature,
    pub seller: Option<&'a Signature>,
}

impl<'a> Authorization<'a> {
    /// Direct call by the buyer or bidder.
    #[must_use]
    pub fn direct(operator: &'a Signature) -> Self {
        Self {
            party: PartyConsent::Caller,
            operator,
            seller: None,
        }
    }

    /// Relayed call carrying the buyer's or bidder's signature.
    #[must_use]
    pub fn relayed(party: &'a Signature, operator: &'a Signature) -> Self {
        Self {
            party: PartyConsent::Signed(party),
            operator,
            seller: None,
        }
    }

    /// Attach the seller presence proof, if one was supplied.
    #[must_use]
    pub fn with_seller(mut self, seller: Option<&'a Signature>) -> Self {
        self.seller = seller;
        self
    }
}

/// What the engine demands for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationRequirement {
    /// The universe operator at the time of the call.
    pub operator: Address,
    pub seller_signature: bool,
}

/// The paying party's role, which picks the rejection reasons.
#[derive(Clone, Copy)]
enum Role {
    Buyer,
    Bidder,
}

impl Role {
    fn not_caller(self) -> EscrowError {
        match self {
            Self::Buyer => EscrowError::OnlyBuyer,
            Self::Bidder => EscrowError::OnlyBidder,
        }
    }

    fn bad_signature(self) -> EscrowError {
        match self {
            Self::Buyer => EscrowError::IncorrectBuyerSignature,
            Self::Bidder => EscrowError::IncorrectBidderSignature,
        }
    }
}

impl PaymentVerifier {
    /// Check every proof a BuyNow needs.
    ///
    /// # Errors
    /// The first authorization failure, in this order: party consent,
    /// operator as observer, operator signature, seller proof.
    pub fn authorize_buy_now(
        &self,
        input: &BuyNowInput,
        auth: &Authorization<'_>,
        sender: &Address,
        req: &AuthorizationRequirement,
    ) -> Result<()> {
        self.authorize(
            Role::Buyer,
            input,
            (&input.payment_id, &input.buyer, &input.seller),
            auth,
            sender,
            req,
        )
    }

    /// Check every proof a bid needs.
    ///
    /// # Errors
    /// Same order as [`PaymentVerifier::authorize_buy_now`].
    pub fn authorize_bid(
        &self,
        input: &BidInput,
        auth: &Authorization<'_>,
        sender: &Address,
        req: &AuthorizationRequirement,
    ) -> Result<()> {
        self.authorize(
            Role::Bidder,
            input,
            (&input.payment_id, &input.bidder, &input.seller),
            auth,
            sender,
            req,
        )
    }

    /// Only the universe's *current* operator may attest a delivery result.
    ///
    /// # Errors
    /// `OnlyOperatorCanSignResult`.
    pub fn authorize_result(
        &self,
        result: &AssetTransferResult,
        sig: &Signature,
        current_operator: &Address,
    ) -> Result<()> {
        if !self.verify_asset_transfer_result(result, current_operator, sig) {
            tracing::warn!(payment = %result.payment_id, "result not signed by current operator");
            return Err(EscrowError::OnlyOperatorCanSignResult);
        }
        Ok(())
    }

    fn authorize<M: TypedMessage>(
        &self,
        role: Role,
        msg: &M,
        (payment_id, party, seller): (&PaymentId, &Address, &Address),
        auth: &Authorization<'_>,
        sender: &Address,
        req: &AuthorizationRequirement,
    ) -> Result<()> {
        match auth.party {
            PartyConsent::Caller if sender != party => return Err(role.not_caller()),
            PartyConsent::Signed(sig) if !self.is_signed_by(msg, party, sig) => {
                tracing::warn!(payment = %payment_id, party = %party, "party signature rejected");
                return Err(role.bad_signature());
            }
            _ => {}
        }

        if req.operator == *party || req.operator == *seller {
            return Err(EscrowError::OperatorNotObserver);
        }
        if !self.is_signed_by(msg, &req.operator, auth.operator) {
            tracing::warn!(payment = %payment_id, operator = %req.operator, "operator signature rejected");
            return Err(EscrowError::IncorrectOperatorSignature);
        }

        match auth.seller {
            Some(sig) if !self.verify_seller_presence(payment_id, seller, sig) => {
                Err(EscrowError::IncorrectSellerSignature)
            }
            None if req.seller_signature => Err(EscrowError::MissingSellerSignature),
            _ => Ok(()),
        }
    }
}
