//! Fee arithmetic.

use crate::constants::BPS_DENOMINATOR;
use crate::{EscrowError, Result};

/// `floor(amount * fee_bps / 10_000)`.
///
/// Truncates toward zero with no rounding adjustment.
///
/// # Errors
/// Returns `ArithmeticOverflow` if `amount * fee_bps` does not fit in `u128`.
pub fn compute_fee_amount(amount: u128, fee_bps: u32) -> Result<u128> {
    amount
        .checked_mul(u128::from(fee_bps))
        .map(|scaled| scaled / u128::from(BPS_DENOMINATOR))
        .ok_or(EscrowError::ArithmeticOverflow)
}

/// Split `amount` into `(seller_proceeds, fee)`.
///
/// # Errors
/// Propagates `compute_fee_amount` errors; fails if `fee_bps` exceeds 100%.
pub fn split_proceeds(amount: u128, fee_bps: u32) -> Result<(u128, u128)> {
    if fee_bps > BPS_DENOMINATOR {
        return Err(EscrowError::FeeAboveHundredPercent { fee_bps });
    }
    let fee = compute_fee_amount(amount, fee_bps)?;
    Ok((amount - fee, fee))
}

/// Whether `offered` beats `previous` by at least `min_increase_bps`.
///
/// Evaluated as `offered * 10_000 >= previous * (10_000 + min_increase_bps)`
/// so no precision is lost to an intermediate division.
///
/// # Errors
/// Returns `ArithmeticOverflow` if either product leaves `u128`.
pub fn meets_min_increase(previous: u128, offered: u128, min_increase_bps: u32) -> Result<bool> {
    let denominator = u128::from(BPS_DENOMINATOR);
    let lhs = offered
        .checked_mul(denominator)
        .ok_or(EscrowError::ArithmeticOverflow)?;
    let rhs = previous
        .checked_mul(denominator + u128::from(min_increase_bps))
        .ok_or(EscrowError::ArithmeticOverflow)?;
    Ok(lhs >= rhs)
}
