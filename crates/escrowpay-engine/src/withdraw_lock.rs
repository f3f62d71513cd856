//! Per-user withdraw lock.
//!
//! By default anyone may trigger a withdrawal on a user's behalf; funds
//! always go to the user's own external account. A user who opts in locks
//! their balance so that only they can trigger it.

use std::collections::HashSet;

use escrowpay_types::{Address, EscrowError, PaymentEvent, Result};

#[derive(Debug, Clone, Default)]
pub struct WithdrawLock {
    only_user: HashSet<Address>,
}

impl WithdrawLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `user`'s own flag.
    pub fn set_only_user_can_withdraw(&mut self, user: Address, flag: bool) -> PaymentEvent {
        if flag {
            self.only_user.insert(user);
        } else {
            self.only_user.remove(&user);
        }
        PaymentEvent::OnlyUserCanWithdraw {
            user,
            only_user_can_withdraw: flag,
        }
    }

    #[must_use]
    pub fn only_user_can_withdraw(&self, user: &Address) -> bool {
        self.only_user.contains(user)
    }

    /// Guard a withdrawal of `user`'s balance triggered by `sender`.
    ///
    /// # Errors
    /// [`EscrowError::NotAuthorizedToWithdraw`] if `user` locked their
    /// balance and `sender` is someone else.
    pub fn check_withdraw(&self, sender: &Address, user: &Address) -> Result<()> {
        if sender != user && self.only_user_can_withdraw(user) {
            return Err(EscrowError::NotAuthorizedToWithdraw { user: *user });
        }
        Ok(())
    }
}
