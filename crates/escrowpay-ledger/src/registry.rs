//! Role registry: per-universe operator and fees collector, each falling
//! back to a global default when the universe has no value of its own.
//!
//! Writes are owner-gated and return the change event (new and previous
//! value) for the caller to publish.

use std::collections::HashMap;

use escrowpay_types::{Address, EscrowError, PaymentEvent, Result, UniverseId};

#[derive(Debug, Clone)]
pub struct RoleRegistry {
    owner: Address,
    default_operator: Address,
    default_fees_collector: Address,
    universe_operators: HashMap<UniverseId, Address>,
    universe_fees_collectors: HashMap<UniverseId, Address>,
}

impl RoleRegistry {
    #[must_use]
    pub fn new(owner: Address, default_operator: Address, default_fees_collector: Address) -> Self {
        Self {
            owner,
            default_operator,
            default_fees_collector,
            universe_operators: HashMap::new(),
            universe_fees_collectors: HashMap::new(),
        }
    }

    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// # Errors
    /// `NotOwner` unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: &Address) -> Result<()> {
        if *caller != self.owner {
            return Err(EscrowError::NotOwner { caller: *caller });
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    #[must_use]
    pub fn default_operator(&self) -> Address {
        self.default_operator
    }

    #[must_use]
    pub fn default_fees_collector(&self) -> Address {
        self.default_fees_collector
    }

    #[must_use]
    pub fn universe_operator(&self, universe: UniverseId) -> Address {
        self.universe_operators
            .get(&universe)
            .copied()
            .unwrap_or(self.default_operator)
    }

    #[must_use]
    pub fn universe_fees_collector(&self, universe: UniverseId) -> Address {
        self.universe_fees_collectors
            .get(&universe)
            .copied()
            .unwrap_or(self.default_fees_collector)
    }

    // -----------------------------------------------------------------
    // Owner-gated writes
    // -----------------------------------------------------------------

    pub fn set_default_operator(&mut self, caller: &Address, operator: Address) -> Result<PaymentEvent> {
        self.ensure_owner(caller)?;
        let prev_operator = std::mem::replace(&mut self.default_operator, operator);
        tracing::info!(operator = %operator, prev = %prev_operator, "default operator set");
        Ok(PaymentEvent::DefaultOperator {
            operator,
            prev_operator,
        })
    }

    pub fn set_universe_operator(
        &mut self,
        caller: &Address,
        universe_id: UniverseId,
        operator: Address,
    ) -> Result<PaymentEvent> {
        self.ensure_owner(caller)?;
        let prev_operator = self.universe_operator(universe_id);
        self.universe_operators.insert(universe_id, operator);
        tracing::info!(universe = %universe_id, operator = %operator, prev = %prev_operator, "universe operator set");
        Ok(PaymentEvent::UniverseOperator {
            universe_id,
            operator,
            prev_operator,
        })
    }

    /// Revert `universe_id` to the default operator.
    pub fn remove_universe_operator(
        &mut self,
        caller: &Address,
        universe_id: UniverseId,
    ) -> Result<PaymentEvent> {
        self.ensure_owner(caller)?;
        let prev_operator = self.universe_operator(universe_id);
        self.universe_operators.remove(&universe_id);
        Ok(PaymentEvent::UniverseOperator {
            universe_id,
            operator: self.default_operator,
            prev_operator,
        })
    }

    pub fn set_default_fees_collector(
        &mut self,
        caller: &Address,
        fees_collector: Address,
    ) -> Result<PaymentEvent> {
        self.ensure_owner(caller)?;
        let prev_fees_collector =
            std::mem::replace(&mut self.default_fees_collector, fees_collector);
        tracing::info!(fees_collector = %fees_collector, prev = %prev_fees_collector, "default fees collector set");
        Ok(PaymentEvent::DefaultFeesCollector {
            fees_collector,
            prev_fees_collector,
        })
    }

    pub fn set_universe_fees_collector(
        &mut self,
        caller: &Address,
        universe_id: UniverseId,
        fees_collector: Address,
    ) -> Result<PaymentEvent> {
        self.ensure_owner(caller)?;
        let prev_fees_collector = self.universe_fees_collector(universe_id);
        self.universe_fees_collectors.insert(universe_id, fees_collector);
        tracing::info!(universe = %universe_id, fees_collector = %fees_collector, "universe fees collector set");
        Ok(PaymentEvent::UniverseFeesCollector {
            universe_id,
            fees_collector,
            prev_fees_collector,
        })
    }

    /// Revert `universe_id` to the default fees collector.
    pub fn remove_universe_fees_collector(
        &mut self,
        caller: &Address,
        universe_id: UniverseId,
    ) -> Result<PaymentEvent> {
        self.ensure_owner(caller)?;
        let prev_fees_collector = self.universe_fees_collector(universe_id);
        self.universe_fees_collectors.remove(&universe_id);
        Ok(PaymentEvent::UniverseFeesCollector {
            universe_id,
            fees_collector: self.default_fees_collector,
            prev_fees_collector,
        })
    }
}
