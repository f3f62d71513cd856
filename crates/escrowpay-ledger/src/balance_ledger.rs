//! The internal, withdrawable balance ledger.
//!
//! One ledger per deployment (and so per currency). Credited with sale
//! proceeds, fees, refunds and, by tenant policy, outbid amounts. Debited by
//! withdrawals and when a balance is reused to fund a new payment. Every
//! mutation either fully applies or leaves the ledger unchanged.

use std::collections::HashMap;

use escrowpay_types::{Address, EscrowError, Result};

#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
    balances: HashMap<Address, u128>,
}

impl BalanceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Increase `user`'s balance.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the balance would leave `u128`.
    pub fn credit(&mut self, user: &Address, amount: u128) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let entry = self.balances.entry(*user).or_default();
        *entry = entry
            .checked_add(amount)
            .ok_or(EscrowError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Decrease `user`'s balance. Empty entries are dropped.
    ///
    /// # Errors
    /// Returns `WithdrawalExceedsBalance` if balance < amount.
    pub fn debit(&mut self, user: &Address, amount: u128) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let available = self.balance_of(user);
        if available < amount {
            return Err(EscrowError::WithdrawalExceedsBalance {
                requested: amount,
                available,
            });
        }
        if available == amount {
            self.balances.remove(user);
        } else {
            self.balances.insert(*user, available - amount);
        }
        Ok(())
    }

    #[must_use]
    pub fn balance_of(&self, user: &Address) -> u128 {
        self.balances.get(user).copied().unwrap_or(0)
    }

    /// Sum of every user's balance.
    #[must_use]
    pub fn total(&self) -> u128 {
        self.balances.values().sum()
    }

    /// Number of users holding a non-zero balance.
    #[must_use]
    pub fn holders(&self) -> usize {
        self.balances.len()
    }
}
