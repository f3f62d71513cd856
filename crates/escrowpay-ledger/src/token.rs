//! Token rail.
//!
//! External funds are pulled through the allowance the payer granted the
//! escrow, exactly the external share and never more. Attached native value
//! is refused.

use std::collections::HashMap;

use escrowpay_types::{Address, EscrowError, Rail, Result};

use crate::funding::{Collection, CollectionRequest, FundingSource};

/// A standard balance/allowance token ledger, as consumed by the escrow.
pub trait TokenLedger {
    fn balance_of(&self, owner: &Address) -> u128;

    fn allowance(&self, owner: &Address, spender: &Address) -> u128;

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128);

    /// # Errors
    /// `InsufficientExternalBalance`.
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<()>;

    /// Spend `spender`'s allowance over `from`.
    ///
    /// # Errors
    /// `InsufficientAllowance`, then `InsufficientExternalBalance`.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<()>;
}

/// In-process token ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryToken {
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
}

impl InMemoryToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// `ArithmeticOverflow`.
    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<()> {
        let entry = self.balances.entry(*to).or_default();
        *entry = entry
            .checked_add(amount)
            .ok_or(EscrowError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Total tokens in circulation.
    #[must_use]
    pub fn total_supply(&self) -> u128 {
        self.balances.values().sum()
    }
}

impl TokenLedger for InMemoryToken {
    fn balance_of(&self, owner: &Address) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        self.allowances.insert((*owner, *spender), amount);
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(EscrowError::InsufficientExternalBalance {
                needed: amount,
                available,
            });
        }
        if from == to || amount == 0 {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(EscrowError::ArithmeticOverflow)?;
        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, to_balance);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<()> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(EscrowError::InsufficientAllowance {
                needed: amount,
                allowance,
            });
        }
        self.transfer(from, to, amount)?;
        self.allowances
            .insert((*from, *spender), allowance - amount);
        Ok(())
    }
}

/// [`FundingSource`] over any [`TokenLedger`].
#[derive(Debug, Clone)]
pub struct TokenRail<T> {
    token: T,
    escrow: Address,
}

impl<T: TokenLedger> TokenRail<T> {
    #[must_use]
    pub fn new(token: T, escrow: Address) -> Self {
        Self { token, escrow }
    }

    #[must_use]
    pub fn token(&self) -> &T {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }
}

impl<T: TokenLedger> FundingSource for TokenRail<T> {
    fn rail(&self) -> Rail {
        Rail::Token
    }

    fn escrow_account(&self) -> Address {
        self.escrow
    }

    fn balance_of(&self, owner: &Address) -> u128 {
        self.token.balance_of(owner)
    }

    fn available_to(&self, owner: &Address) -> u128 {
        self.token
            .balance_of(owner)
            .min(self.token.allowance(owner, &self.escrow))
    }

    fn plan_collection(&self, req: &CollectionRequest) -> Result<Collection> {
        if req.attached_value != 0 {
            return Err(EscrowError::UnexpectedValue {
                value: req.attached_value,
            });
        }
        let needed = req.external_needed;
        let allowance = self.token.allowance(&req.payer, &self.escrow);
        if allowance < needed {
            return Err(EscrowError::InsufficientAllowance { needed, allowance });
        }
        let available = self.token.balance_of(&req.payer);
        if available < needed {
            return Err(EscrowError::InsufficientExternalBalance { needed, available });
        }
        Ok(Collection {
            from: req.payer,
            pull: needed,
            surplus: 0,
        })
    }

    fn debit(&mut self, from: &Address, amount: u128) -> Result<()> {
        let escrow = self.escrow;
        self.token.transfer_from(&escrow, from, &escrow, amount)
    }

    fn credit(&mut self, to: &Address, amount: u128) -> Result<()> {
        let escrow = self.escrow;
        self.token.transfer(&escrow, to, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 32])
    }

    const ESCROW: u8 = 0xee;

    fn rail() -> TokenRail<InMemoryToken> {
        let mut token = InMemoryToken::new();
        token.mint(&addr(1), 1_000).unwrap();
        TokenRail::new(token, addr(ESCROW))
    }

    fn request(external_needed: u128) -> CollectionRequest {
        CollectionRequest {
            payer: addr(1),
            sender: addr(7),
            attached_value: 0,
            external_needed,
            amount: 300,
            exact: false,
        }
    }

    #[test]
    fn allowance_checked_before_balance() {
        let r = rail();
        let err = r.plan_collection(&request(300)).unwrap_err();
        assert!(matches!(err, EscrowError::InsufficientAllowance { .. }));
    }

    #[test]
    fn balance_checked_after_allowance() {
        let mut r = rail();
        r.token_mut().approve(&addr(1), &addr(ESCROW), 5_000);
        let err = r.plan_collection(&request(2_000)).unwrap_err();
        assert!(matches!(err, EscrowError::InsufficientExternalBalance { .. }));
    }

    #[test]
    fn pulls_exact_external_share_from_payer() {
        let mut r = rail();
        r.token_mut().approve(&addr(1), &addr(ESCROW), 500);
        let plan = r.plan_collection(&request(123)).unwrap();
        assert_eq!(plan.from, addr(1));
        assert_eq!(plan.pull, 123);
        assert_eq!(plan.surplus, 0);

        r.debit(&plan.from, plan.pull).unwrap();
        assert_eq!(r.escrow_holdings(), 123);
        assert_eq!(r.token().allowance(&addr(1), &addr(ESCROW)), 377);
    }

    #[test]
    fn attached_value_refused() {
        let r = rail();
        let mut req = request(0);
        req.attached_value = 1;
        assert!(matches!(
            r.plan_collection(&req),
            Err(EscrowError::UnexpectedValue { value: 1 })
        ));
    }

    #[test]
    fn available_is_min_of_balance_and_allowance() {
        let mut r = rail();
        assert_eq!(r.available_to(&addr(1)), 0);
        r.token_mut().approve(&addr(1), &addr(ESCROW), 400);
        assert_eq!(r.available_to(&addr(1)), 400);
        r.token_mut().approve(&addr(1), &addr(ESCROW), 4_000);
        assert_eq!(r.available_to(&addr(1)), 1_000);
    }

    #[test]
    fn credit_pays_out_of_escrow() {
        let mut r = rail();
        r.token_mut().approve(&addr(1), &addr(ESCROW), 300);
        r.debit(&addr(1), 300).unwrap();
        r.credit(&addr(2), 285).unwrap();
        assert_eq!(r.balance_of(&addr(2)), 285);
        assert_eq!(r.token().total_supply(), 1_000);
    }
}
