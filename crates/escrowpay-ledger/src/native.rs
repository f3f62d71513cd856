//! Native-coin rail.
//!
//! External funds arrive as value attached to the call and are drawn from
//! the sender's coin account. The attached value must lie between the
//! external share and the full amount; whatever exceeds the external share
//! lands in the payer's ledger.

use std::collections::HashMap;

use escrowpay_types::{Address, EscrowError, Rail, Result};

use crate::funding::{Collection, CollectionRequest, FundingSource};

/// Coin balances outside the escrow.
#[derive(Debug, Clone, Default)]
pub struct NativeBank {
    balances: HashMap<Address, u128>,
}

impl NativeBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create coins out of thin air (genesis allocation, faucets).
    ///
    /// # Errors
    /// `ArithmeticOverflow`.
    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<()> {
        let entry = self.balances.entry(*to).or_default();
        *entry = entry
            .checked_add(amount)
            .ok_or(EscrowError::ArithmeticOverflow)?;
        Ok(())
    }

    #[must_use]
    pub fn balance_of(&self, owner: &Address) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    /// # Errors
    /// `InsufficientExternalBalance` or `ArithmeticOverflow`; nothing moves
    /// on error.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<()> {
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
}

/// [`FundingSource`] over a [`NativeBank`].
#[derive(Debug, Clone)]
pub struct NativeRail {
    bank: NativeBank,
    escrow: Address,
}

impl NativeRail {
    #[must_use]
    pub fn new(bank: NativeBank, escrow: Address) -> Self {
        Self { bank, escrow }
    }

    #[must_use]
    pub fn bank(&self) -> &NativeBank {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut NativeBank {
        &mut self.bank
    }
}

impl FundingSource for NativeRail {
    fn rail(&self) -> Rail {
        Rail::Native
    }

    fn escrow_account(&self) -> Address {
        self.escrow
    }

    fn balance_of(&self, owner: &Address) -> u128 {
        self.bank.balance_of(owner)
    }

    fn available_to(&self, owner: &Address) -> u128 {
        self.bank.balance_of(owner)
    }

    fn plan_collection(&self, req: &CollectionRequest) -> Result<Collection> {
        let provided = req.attached_value;
        if provided > req.amount {
            return Err(EscrowError::FundsAboveAmount {
                provided,
                amount: req.amount,
            });
        }
        if provided < req.external_needed {
            return Err(EscrowError::FundsOutOfRange {
                provided,
                required: req.external_needed,
            });
        }
        if req.exact && provided != req.external_needed {
            return Err(EscrowError::FundsMustMatchIncrement {
                provided,
                required: req.external_needed,
            });
        }
        let available = self.bank.balance_of(&req.sender);
        if available < provided {
            return Err(EscrowError::InsufficientExternalBalance {
                needed: provided,
                available,
            });
        }
        Ok(Collection {
            from: req.sender,
            pull: provided,
            surplus: provided - req.external_needed,
        })
    }

    fn debit(&mut self, from: &Address, amount: u128) -> Result<()> {
        let escrow = self.escrow;
        self.bank.transfer(from, &escrow, amount)
    }

    fn credit(&mut self, to: &Address, amount: u128) -> Result<()> {
        let escrow = self.escrow;
        self.bank.transfer(&escrow, to, amount)
    }
}
