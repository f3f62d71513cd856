//! Payment storage keyed by payment identifier.

use std::collections::HashMap;

use escrowpay_types::{Payment, PaymentId, PaymentState};

#[derive(Debug, Clone, Default)]
pub struct PaymentBook {
    payments: HashMap<PaymentId, Payment>,
}

impl PaymentBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &PaymentId) -> Option<&Payment> {
        self.payments.get(id)
    }

    pub fn get_mut(&mut self, id: &PaymentId) -> Option<&mut Payment> {
        self.payments.get_mut(id)
    }

    pub fn insert(&mut self, payment: Payment) {
        self.payments.insert(payment.id, payment);
    }

    /// Derived state at `now`. Unknown identifiers are `NOT_STARTED`.
    #[must_use]
    pub fn state_at(&self, id: &PaymentId, now: u64) -> PaymentState {
        self.payments
            .get(id)
            .map_or(PaymentState::NotStarted, |p| p.state_at(now))
    }

    /// Sum of committed amounts over payments not yet resolved.
    #[must_use]
    pub fn in_flight_total(&self) -> u128 {
        self.payments
            .values()
            .filter(|p| !p.state.is_terminal())
            .map(|p| p.amount)
            .sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.payments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}
