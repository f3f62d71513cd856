//! Settlement: operator-attested finalize and the timeout refund.
//!
//! Both paths resolve an `ASSET_TRANSFERRING` payment into the ledger. A
//! successful delivery credits the seller with the proceeds and the fees
//! collector snapshotted at creation with the fee. A failed delivery, or
//! an expired payment, credits the buyer with the full amount.

use escrowpay_ledger::FundingSource;
use escrowpay_types::{
    Address, AssetTransferResult, EscrowError, Payment, PaymentEvent, PaymentId, PaymentState,
    Result, Signature, split_proceeds,
};

use crate::context::CallContext;
use crate::engine::PaymentsEngine;

impl<F: FundingSource> PaymentsEngine<F> {
    /// Resolve a payment with a delivery result signed by the universe's
    /// current operator. Anyone may submit it.
    ///
    /// # Errors
    /// `NotAssetTransferring` unless the payment is awaiting its result,
    /// `OnlyOperatorCanSignResult` for any other signer.
    pub fn finalize(
        &mut self,
        ctx: &CallContext,
        result: &AssetTransferResult,
        operator_sig: &Signature,
    ) -> Result<()> {
        Self::ensure_no_value(ctx)?;
        let payment = self.awaiting_result(&result.payment_id, ctx.now)?;
        let operator = self.registry.universe_operator(payment.universe_id);
        self.verifier
            .authorize_result(result, operator_sig, &operator)?;
        self.resolve(payment, ctx.now, result.was_successful)?;
        Ok(())
    }

    /// Refund the buyer of a payment whose window has elapsed. Anyone may
    /// call it.
    ///
    /// # Errors
    /// `RefundNotAccepted` before expiration or outside
    /// `ASSET_TRANSFERRING`.
    pub fn refund(&mut self, ctx: &CallContext, payment_id: &PaymentId) -> Result<()> {
        Self::ensure_no_value(ctx)?;
        let payment = self.refundable(payment_id, ctx.now)?;
        self.resolve(payment, ctx.now, false)?;
        Ok(())
    }

    /// [`PaymentsEngine::finalize`], then pay the beneficiary's whole
    /// ledger balance out: the seller on success, the buyer on failure.
    ///
    /// # Errors
    /// As `finalize`, plus `NotAuthorizedToWithdraw` when the beneficiary
    /// locked their balance and is not the caller.
    pub fn finalize_and_withdraw(
        &mut self,
        ctx: &CallContext,
        result: &AssetTransferResult,
        operator_sig: &Signature,
    ) -> Result<()> {
        Self::ensure_no_value(ctx)?;
        let payment = self.awaiting_result(&result.payment_id, ctx.now)?;
        let beneficiary = if result.was_successful {
            payment.seller
        } else {
            payment.buyer
        };
        self.withdraw_lock.check_withdraw(&ctx.sender, &beneficiary)?;
        let operator = self.registry.universe_operator(payment.universe_id);
        self.verifier
            .authorize_result(result, operator_sig, &operator)?;
        self.resolve_and_withdraw(payment, ctx.now, result.was_successful, &beneficiary)
    }

    /// [`PaymentsEngine::refund`], then pay the buyer's whole ledger
    /// balance out.
    ///
    /// # Errors
    /// As `refund`, plus `NotAuthorizedToWithdraw`.
    pub fn refund_and_withdraw(&mut self, ctx: &CallContext, payment_id: &PaymentId) -> Result<()> {
        Self::ensure_no_value(ctx)?;
        let payment = self.refundable(payment_id, ctx.now)?;
        let buyer = payment.buyer;
        self.withdraw_lock.check_withdraw(&ctx.sender, &buyer)?;
        self.resolve_and_withdraw(payment, ctx.now, false, &buyer)
    }

    // -----------------------------------------------------------------
    // internals
    // -----------------------------------------------------------------

    fn awaiting_result(&self, id: &PaymentId, now: u64) -> Result<Payment> {
        let state = self.payments.state_at(id, now);
        if state != PaymentState::AssetTransferring {
            return Err(EscrowError::NotAssetTransferring { state });
        }
        self.payments
            .get(id)
            .cloned()
            .ok_or(EscrowError::NotAssetTransferring { state: PaymentState::NotStarted })
    }

    fn refundable(&self, id: &PaymentId, now: u64) -> Result<Payment> {
        match self.payments.get(id) {
            Some(p) if p.accepts_refunds(now) => Ok(p.clone()),
            _ => Err(EscrowError::RefundNotAccepted(*id)),
        }
    }

    /// Resolve, then pay `beneficiary` out. A failed payout restores the
    /// stored payment and undoes its credits and events.
    fn resolve_and_withdraw(
        &mut self,
        payment: Payment,
        now: u64,
        success: bool,
        beneficiary: &Address,
    ) -> Result<()> {
        let pending = payment.clone();
        let pending_id = pending.id;
        let events_before = self.events.len();
        let credits = self.resolve(payment, now, success)?;
        if let Err(e) = self.withdraw_all(beneficiary) {
            for (user, amount) in &credits {
                self.ledger.debit(user, *amount)?;
            }
            self.payments.insert(pending);
            self.events.truncate(events_before);
            tracing::warn!(
                payment = %pending_id,
                user = %beneficiary,
                error = %e,
                "settlement rolled back"
            );
            return Err(e);
        }
        Ok(())
    }

    /// Credit the ledger and store the terminal state. Auction timing is
    /// dropped once resolved. Returns the ledger credits made.
    fn resolve(
        &mut self,
        payment: Payment,
        now: u64,
        success: bool,
    ) -> Result<Vec<(Address, u128)>> {
        let mut resolved = payment;
        resolved.materialize(now);
        let (target, event) = if success {
            (
                PaymentState::Paid,
                PaymentEvent::Paid {
                    payment_id: resolved.id,
                },
            )
        } else {
            (
                PaymentState::Refunded,
                PaymentEvent::BuyerRefunded {
                    payment_id: resolved.id,
                    buyer: resolved.buyer,
                },
            )
        };
        resolved.transition(target)?;
        resolved.auction = None;

        let credits: Vec<(Address, u128)> = if success {
            let (proceeds, fee) = split_proceeds(resolved.amount, resolved.fee_bps)?;
            vec![(resolved.seller, proceeds), (resolved.fees_collector, fee)]
        } else {
            vec![(resolved.buyer, resolved.amount)]
        };
        for (user, amount) in &credits {
            self.ledger.credit(user, *amount)?;
        }

        tracing::info!(
            payment = %resolved.id,
            state = %resolved.state,
            amount = resolved.amount,
            fee_bps = resolved.fee_bps,
            "payment resolved"
        );
        self.payments.insert(resolved);
        self.emit(event);
        Ok(credits)
    }
}
