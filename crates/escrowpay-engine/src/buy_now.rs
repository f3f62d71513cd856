//! Fixed-price purchases.

use escrowpay_auth::{Authorization, AuthorizationRequirement};
use escrowpay_ledger::FundingSource;
use escrowpay_types::{
    BuyNowInput, EscrowError, Payment, PaymentEvent, PaymentState, Result, Signature,
};

use crate::context::CallContext;
use crate::engine::PaymentsEngine;

impl<F: FundingSource> PaymentsEngine<F> {
    /// BuyNow sent by the buyer.
    ///
    /// # Errors
    /// Any authorization, temporal, state or economic rejection. Nothing
    /// changes on error.
    pub fn buy_now(
        &mut self,
        ctx: &CallContext,
        input: &BuyNowInput,
        operator_sig: &Signature,
        seller_sig: Option<&Signature>,
    ) -> Result<()> {
        let auth = Authorization::direct(operator_sig).with_seller(seller_sig);
        self.execute_buy_now(ctx, input, &auth)
    }

    /// BuyNow sent by a relayer carrying the buyer's signature.
    ///
    /// # Errors
    /// As [`PaymentsEngine::buy_now`].
    pub fn relayed_buy_now(
        &mut self,
        ctx: &CallContext,
        input: &BuyNowInput,
        buyer_sig: &Signature,
        operator_sig: &Signature,
        seller_sig: Option<&Signature>,
    ) -> Result<()> {
        let auth = Authorization::relayed(buyer_sig, operator_sig).with_seller(seller_sig);
        self.execute_buy_now(ctx, input, &auth)
    }

    fn execute_buy_now(
        &mut self,
        ctx: &CallContext,
        input: &BuyNowInput,
        auth: &Authorization<'_>,
    ) -> Result<()> {
        let state = self.payments.state_at(&input.payment_id, ctx.now);
        if state != PaymentState::NotStarted {
            return Err(EscrowError::IncorrectPaymentState { state });
        }

        let tenant = self.tenant_config(input.universe_id);
        self.validate_purchase(input, &tenant, ctx.now, EscrowError::ZeroAmount)?;
        self.verifier.authorize_buy_now(
            input,
            auth,
            &ctx.sender,
            &AuthorizationRequirement {
                operator: tenant.operator,
                seller_signature: self.funding.rail().requires_seller_signature(),
            },
        )?;

        let expiration_time = ctx
            .now
            .checked_add(tenant.payment_window)
            .ok_or(EscrowError::ArithmeticOverflow)?;
        let plan = self.plan_funding(ctx, input.buyer, input.amount, input.amount, false)?;

        // ---- all checks passed; write ----
        self.commit_funding(&plan)?;
        self.payments.insert(Payment {
            id: input.payment_id,
            state: PaymentState::AssetTransferring,
            buyer: input.buyer,
            seller: input.seller,
            operator: tenant.operator,
            fees_collector: tenant.fees_collector,
            universe_id: input.universe_id,
            amount: input.amount,
            fee_bps: input.fee_bps,
            expiration_time,
            auction: None,
        });

        tracing::info!(
            payment = %input.payment_id,
            buyer = %input.buyer,
            seller = %input.seller,
            amount = input.amount,
            expiration_time,
            "buy now accepted"
        );
        self.emit(PaymentEvent::BuyNow {
            payment_id: input.payment_id,
            buyer: input.buyer,
            seller: input.seller,
        });
        Ok(())
    }
}
