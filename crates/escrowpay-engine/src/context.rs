//! Per-call context: who is calling, when, and with how much native value.

use chrono::Utc;
use escrowpay_types::Address;

/// The transaction envelope every mutating call receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub sender: Address,
    /// Unix seconds. Coarse and non-decreasing across calls.
    pub now: u64,
    /// Native value attached to the call.
    pub value: u128,
}

impl CallContext {
    #[must_use]
    pub fn new(sender: Address, now: u64) -> Self {
        Self {
            sender,
            now,
            value: 0,
        }
    }

    /// A call stamped with the current wall-clock time.
    #[must_use]
    pub fn at_wall_clock(sender: Address) -> Self {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        Self::new(sender, now)
    }

    #[must_use]
    pub fn with_value(mut self, value: u128) -> Self {
        self.value = value;
        self
    }
}
