//! English auctions: opening bid, later bids, outbid refunds and the
//! anti-snipe extension.
//!
//! A first bid on a fresh identifier opens the auction and puts it in
//! `AUCTIONING`. Later bids must beat the standing bid by the universe's
//! minimum increase. A bidder raising their own standing bid funds only the
//! difference. Any other bidder displaces the standing one, whose amount is
//! returned to them. Every later bid must name the auction's seller and
//! universe.

use escrowpay_auth::{Authorization, AuthorizationRequirement};
use escrowpay_ledger::{AuctionFundingSplit, FundingSource, split_funding};
use escrowpay_types::{
    Address, AuctionData, BidInput, EscrowError, Payment, PaymentEvent, PaymentId, PaymentState,
    Result, Signature, meets_min_increase,
};

use crate::auction;
use crate::context::CallContext;
use crate::engine::PaymentsEngine;

impl<F: FundingSource> PaymentsEngine<F> {
    /// Bid sent by the bidder.
    ///
    /// # Errors
    /// Any authorization, temporal, state or economic rejection. Nothing
    /// changes on error.
    pub fn bid(
        &mut self,
        ctx: &CallContext,
        input: &BidInput,
        operator_sig: &Signature,
        seller_sig: Option<&Signature>,
    ) -> Result<()> {
        let auth = Authorization::direct(operator_sig).with_seller(seller_sig);
        self.execute_bid(ctx, input, &auth)
    }

    /// Bid sent by a relayer carrying the bidder's signature.
    ///
    /// # Errors
    /// As [`PaymentsEngine::bid`].
    pub fn relayed_bid(
        &mut self,
        ctx: &CallContext,
        input: &BidInput,
        bidder_sig: &Signature,
        operator_sig: &Signature,
        seller_sig: Option<&Signature>,
    ) -> Result<()> {
        let auth = Authorization::relayed(bidder_sig, operator_sig).with_seller(seller_sig);
        self.execute_bid(ctx, input, &auth)
    }

    /// How `input` would be funded if submitted at `now`.
    ///
    /// A bidder who already holds the standing bid needs only the
    /// difference.
    #[must_use]
    pub fn split_auction_funding_sources(&self, input: &BidInput, now: u64) -> AuctionFundingSplit {
        let standing = self
            .payments
            .get(&input.payment_id)
            .filter(|p| p.state_at(now) == PaymentState::Auctioning);
        let is_same_bidder = standing.is_some_and(|p| p.buyer == input.bidder);
        let required = match standing {
            Some(p) if is_same_bidder => input.bid_amount.saturating_sub(p.amount),
            _ => input.bid_amount,
        };
        AuctionFundingSplit {
            split: split_funding(self.ledger.balance_of(&input.bidder), required),
            is_same_bidder,
        }
    }

    fn execute_bid(
        &mut self,
        ctx: &CallContext,
        input: &BidInput,
        auth: &Authorization<'_>,
    ) -> Result<()> {
        match self.payments.state_at(&input.payment_id, ctx.now) {
            PaymentState::NotStarted => self.open_auction(ctx, input, auth),
            PaymentState::Auctioning => self.raise_auction(ctx, input, auth),
            state => Err(EscrowError::BidsNotAccepted { state }),
        }
    }

    fn open_auction(
        &mut self,
        ctx: &CallContext,
        input: &BidInput,
        auth: &Authorization<'_>,
    ) -> Result<()> {
        let tenant = self.tenant_config(input.universe_id);
        self.validate_purchase(&input.as_purchase(), &tenant, ctx.now, EscrowError::ZeroBid)?;
        self.verifier.authorize_bid(
            input,
            auth,
            &ctx.sender,
            &AuthorizationRequirement {
                operator: tenant.operator,
                seller_signature: self.funding.rail().requires_seller_signature(),
            },
        )?;
        let opening = auction::open(input.ends_at, ctx.now, &tenant.auction, tenant.payment_window)?;
        let plan = self.plan_funding(ctx, input.bidder, input.bid_amount, input.bid_amount, false)?;

        self.commit_funding(&plan)?;
        self.payments.insert(Payment {
            id: input.payment_id,
            state: PaymentState::Auctioning,
            buyer: input.bidder,
            seller: input.seller,
            operator: tenant.operator,
            fees_collector: tenant.fees_collector,
            universe_id: input.universe_id,
            amount: input.bid_amount,
            fee_bps: input.fee_bps,
            expiration_time: opening.expiration_time,
            auction: Some(opening.auction),
        });

        tracing::info!(
            payment = %input.payment_id,
            bidder = %input.bidder,
            amount = input.bid_amount,
            ends_at = opening.auction.ends_at,
            extendable_until = opening.auction.extendable_until,
            "auction opened"
        );
        self.emit_bid(input, input.seller, opening.auction.ends_at);
        Ok(())
    }

    fn raise_auction(
        &mut self,
        ctx: &CallContext,
        input: &BidInput,
        auth: &Authorization<'_>,
    ) -> Result<()> {
        let (payment, auction) = self.standing_auction(&input.payment_id)?;
        let tenant = self.tenant_config(payment.universe_id);

        if input.bid_amount == 0 {
            return Err(EscrowError::ZeroBid);
        }
        if ctx.now > input.deadline {
            return Err(EscrowError::DeadlineExpired {
                deadline: input.deadline,
                now: ctx.now,
            });
        }
        if input.seller != payment.seller {
            return Err(EscrowError::SellerMismatch {
                offered: input.seller,
                stored: payment.seller,
            });
        }
        if input.universe_id != payment.universe_id {
            return Err(EscrowError::UniverseMismatch {
                offered: input.universe_id,
                stored: payment.universe_id,
            });
        }
        if input.bidder == payment.seller {
            return Err(EscrowError::BuyerSellerCoincide);
        }
        if self.funding.rail().enforces_auction_consistency() {
            if input.fee_bps != payment.fee_bps {
                return Err(EscrowError::FeeMismatch {
                    offered: input.fee_bps,
                    locked: payment.fee_bps,
                });
            }
            if input.ends_at > auction.extendable_until {
                return Err(EscrowError::EndsAtMismatch);
            }
        }
        self.verifier.authorize_bid(
            input,
            auth,
            &ctx.sender,
            &AuthorizationRequirement {
                operator: tenant.operator,
                seller_signature: self.funding.rail().requires_seller_signature(),
            },
        )?;
        if !meets_min_increase(payment.amount, input.bid_amount, tenant.auction.min_increase_bps)? {
            return Err(EscrowError::BidIncrementTooSmall {
                previous: payment.amount,
                offered: input.bid_amount,
                min_increase_bps: tenant.auction.min_increase_bps,
            });
        }

        let previous_bidder = payment.buyer;
        let previous_amount = payment.amount;
        let is_same_bidder = previous_bidder == input.bidder;
        let required = if is_same_bidder {
            input.bid_amount - previous_amount
        } else {
            input.bid_amount
        };
        let plan = self.plan_funding(ctx, input.bidder, required, input.bid_amount, is_same_bidder)?;
        let ends_at = auction::extended_ends_at(&auction, ctx.now, tenant.auction.time_to_extend);

        self.commit_funding(&plan)?;
        if !is_same_bidder {
            self.refund_outbid(
                &input.payment_id,
                previous_bidder,
                previous_amount,
                tenant.to_local_balance_on_outbid,
            )?;
        }
        if let Some(p) = self.payments.get_mut(&input.payment_id) {
            p.buyer = input.bidder;
            p.amount = input.bid_amount;
            p.auction = Some(AuctionData { ends_at, ..auction });
        }

        if ends_at != auction.ends_at {
            tracing::debug!(
                payment = %input.payment_id,
                from = auction.ends_at,
                to = ends_at,
                cap = auction.extendable_until,
                "auction extended"
            );
        }
        tracing::info!(
            payment = %input.payment_id,
            bidder = %input.bidder,
            amount = input.bid_amount,
            same_bidder = is_same_bidder,
            "bid accepted"
        );
        self.emit_bid(input, payment.seller, ends_at);
        Ok(())
    }

    /// The stored payment and its auction timing.
    fn standing_auction(&self, id: &PaymentId) -> Result<(Payment, AuctionData)> {
        let payment = self
            .payments
            .get(id)
            .ok_or(EscrowError::BidsNotAccepted {
                state: PaymentState::NotStarted,
            })?;
        let auction = payment.auction.ok_or_else(|| {
            EscrowError::Internal(format!("{id} is auctioning without auction data"))
        })?;
        Ok((payment.clone(), auction))
    }

    /// Return a displaced bid. The amount lands in the ledger first; under
    /// the external policy it is then paid out, and stays in the ledger if
    /// the transfer fails.
    fn refund_outbid(
        &mut self,
        id: &PaymentId,
        bidder: Address,
        amount: u128,
        to_local: bool,
    ) -> Result<()> {
        self.ledger.credit(&bidder, amount)?;
        if to_local {
            tracing::debug!(payment = %id, bidder = %bidder, amount, "outbid refunded to ledger");
            return Ok(());
        }
        match self.payout(&bidder, amount) {
            Ok(()) => {
                tracing::debug!(payment = %id, bidder = %bidder, amount, "outbid refunded externally");
            }
            Err(e) => {
                tracing::warn!(
                    payment = %id,
                    bidder = %bidder,
                    amount,
                    error = %e,
                    "outbid payout failed, amount kept in ledger"
                );
            }
        }
        Ok(())
    }

    fn emit_bid(&mut self, input: &BidInput, seller: Address, ends_at: u64) {
        self.emit(PaymentEvent::Bid {
            payment_id: input.payment_id,
            bidder: input.bidder,
            seller,
            bid_amount: input.bid_amount,
            ends_at,
        });
    }
}
