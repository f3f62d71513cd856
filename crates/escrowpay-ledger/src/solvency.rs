//! Escrow solvency invariant checker.
//!
//! Two identities must hold after every state-mutating call:
//! ```text
//! holdings == Σ(inflows) - Σ(outflows)
//! holdings == Σ(ledger balances) + Σ(amount of unresolved payments)
//! ```
//!
//! The first catches a rail moving funds behind the engine's back; the
//! second catches the engine crediting more than it escrowed. If either
//! breaks, the deployment must stop accepting calls.

use escrowpay_types::{EscrowError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct SolvencyTracker {
    inflows: u128,
    outflows: u128,
}

/// Snapshot of the quantities the invariant compares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolvencyReport {
    pub holdings: u128,
    pub ledger_total: u128,
    pub in_flight: u128,
}

impl SolvencyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Funds pulled into the escrow.
    pub fn record_inflow(&mut self, amount: u128) {
        self.inflows = self.inflows.saturating_add(amount);
    }

    /// Funds paid out of the escrow.
    pub fn record_outflow(&mut self, amount: u128) {
        self.outflows = self.outflows.saturating_add(amount);
    }

    /// Inflows minus outflows.
    #[must_use]
    pub fn expected_holdings(&self) -> u128 {
        self.inflows.saturating_sub(self.outflows)
    }

    #[must_use]
    pub fn total_inflows(&self) -> u128 {
        self.inflows
    }

    #[must_use]
    pub fn total_outflows(&self) -> u128 {
        self.outflows
    }

    /// # Errors
    /// [`EscrowError::SolvencyViolation`] if either identity fails.
    pub fn verify(&self, report: &SolvencyReport) -> Result<()> {
        let expected = self.expected_holdings();
        if report.holdings != expected {
            return Err(EscrowError::SolvencyViolation {
                reason: format!(
                    "holdings {} != expected {expected} (inflows={}, outflows={})",
                    report.holdings, self.inflows, self.outflows
                ),
            });
        }
        let owed = report
            .ledger_total
            .checked_add(report.in_flight)
            .ok_or(EscrowError::ArithmeticOverflow)?;
        if report.holdings != owed {
            return Err(EscrowError::SolvencyViolation {
                reason: format!(
                    "holdings {} != owed {owed} (ledger={}, in_flight={})",
                    report.holdings, report.ledger_total, report.in_flight
                ),
            });
        }
        Ok(())
    }
}
