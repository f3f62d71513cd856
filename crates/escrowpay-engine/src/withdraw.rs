//! Withdrawals from the ledger to the user's external account.

use escrowpay_ledger::FundingSource;
use escrowpay_types::{Address, EscrowError, PaymentEvent, Result};

use crate::context::CallContext;
use crate::engine::PaymentsEngine;

impl<F: FundingSource> PaymentsEngine<F> {
    /// Withdraw the caller's whole ledger balance.
    ///
    /// # Errors
    /// `ZeroWithdrawal` on an empty balance.
    pub fn withdraw(&mut self, ctx: &CallContext) -> Result<u128> {
        Self::ensure_no_value(ctx)?;
        let amount = self.ledger.balance_of(&ctx.sender);
        self.withdraw_exact(&ctx.sender, amount)?;
        Ok(amount)
    }

    /// Withdraw part of the caller's ledger balance.
    ///
    /// # Errors
    /// `ZeroWithdrawal`, `WithdrawalExceedsBalance`.
    pub fn withdraw_amount(&mut self, ctx: &CallContext, amount: u128) -> Result<()> {
        Self::ensure_no_value(ctx)?;
        self.withdraw_exact(&ctx.sender, amount)
    }

    /// Withdraw `user`'s whole balance on their behalf. Funds always go to
    /// `user`.
    ///
    /// # Errors
    /// `NotAuthorizedToWithdraw` if `user` locked their balance,
    /// `ZeroWithdrawal` on an empty balance.
    pub fn relayed_withdraw(&mut self, ctx: &CallContext, user: &Address) -> Result<u128> {
        Self::ensure_no_value(ctx)?;
        self.withdraw_lock.check_withdraw(&ctx.sender, user)?;
        let amount = self.ledger.balance_of(user);
        self.withdraw_exact(user, amount)?;
        Ok(amount)
    }

    /// Pay out whatever `user` holds. An empty balance is a no-op.
    pub(crate) fn withdraw_all(&mut self, user: &Address) -> Result<u128> {
        let amount = self.ledger.balance_of(user);
        if amount > 0 {
            self.withdraw_exact(user, amount)?;
        }
        Ok(amount)
    }

    fn withdraw_exact(&mut self, user: &Address, amount: u128) -> Result<()> {
        if amount == 0 {
            return Err(EscrowError::ZeroWithdrawal);
        }
        let available = self.ledger.balance_of(user);
        if amount > available {
            return Err(EscrowError::WithdrawalExceedsBalance {
                requested: amount,
                available,
            });
        }
        self.payout(user, amount)?;
        tracing::info!(user = %user, amount, remaining = available - amount, "withdrawal");
        self.emit(PaymentEvent::Withdraw {
            user: *user,
            amount,
        });
        Ok(())
    }
}
