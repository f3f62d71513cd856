//! Auction timing rules: opening checks and the anti-snipe extension.
//!
//! Pure functions of their inputs. The engine applies the results.
//!
//! ```text
//!   now        ends_at (requested)         extendable_until        expiration_time
//!    │──────────────│───────────────────────────────│───── ≥ margin ─────│
//!                   └──────── extendable_by ────────┘
//!                   └──────────────────── payment_window ───────────────┘
//! ```

use escrowpay_types::{AuctionConfig, AuctionData, EscrowError, Result, constants};

/// Timing fixed when an auction opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctionOpening {
    pub auction: AuctionData,
    pub expiration_time: u64,
}

/// Validate a first bid's requested `ends_at` and derive the auction's
/// timing. `ends_at` must lie strictly after `now`.
///
/// `extendable_until` and `expiration_time` are anchored on the requested
/// `ends_at`. If that lies within `time_to_extend` of `now`, the returned
/// `ends_at` is already pushed forward once.
///
/// # Errors
/// `EndsAtInPast`, `EndsAtTooFar`, `AuctionTooCloseToExpiration`,
/// `ArithmeticOverflow`.
pub fn open(
    requested_ends_at: u64,
    now: u64,
    config: &AuctionConfig,
    payment_window: u64,
) -> Result<AuctionOpening> {
    if requested_ends_at <= now {
        return Err(EscrowError::EndsAtInPast {
            ends_at: requested_ends_at,
            now,
        });
    }
    let max = now.saturating_add(constants::MAX_AUCTION_DURATION);
    if requested_ends_at > max {
        return Err(EscrowError::EndsAtTooFar {
            ends_at: requested_ends_at,
            max,
        });
    }

    let extendable_until = requested_ends_at
        .checked_add(config.extendable_by)
        .ok_or(EscrowError::ArithmeticOverflow)?;
    let expiration_time = requested_ends_at
        .checked_add(payment_window)
        .ok_or(EscrowError::ArithmeticOverflow)?;
    if extendable_until.saturating_add(constants::AUCTION_EXPIRATION_MARGIN) > expiration_time {
        return Err(EscrowError::AuctionTooCloseToExpiration);
    }

    let opened = AuctionData {
        ends_at: requested_ends_at,
        extendable_until,
    };
    Ok(AuctionOpening {
        auction: AuctionData {
            ends_at: extended_ends_at(&opened, now, config.time_to_extend),
            extendable_until,
        },
        expiration_time,
    })
}

/// Close time after a bid at `now`.
///
/// A bid strictly within `time_to_extend` of `ends_at` pushes it forward by
/// `time_to_extend`, never past `extendable_until`.
#[must_use]
pub fn extended_ends_at(auction: &AuctionData, now: u64, time_to_extend: u64) -> u64 {
    if now.saturating_add(time_to_extend) <= auction.ends_at {
        return auction.ends_at;
    }
    auction
        .ends_at
        .saturating_add(time_to_extend)
        .min(auction.extendable_until)
        .max(auction.ends_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use escrowpay_types::constants::{DAY, HOUR};

    const NOW: u64 = 1_700_000_000;

    fn config() -> AuctionConfig {
        AuctionConfig::default()
    }

    #[test]
    fn opening_far_from_now_keeps_ends_at() {
        let ends_at = NOW + 3 * DAY;
        let o = open(ends_at, NOW, &config(), 30 * DAY).unwrap();
        assert_eq!(o.auction.ends_at, ends_at);
        assert_eq!(o.auction.extendable_until, ends_at + DAY);
        assert_eq!(o.expiration_time, ends_at + 30 * DAY);
    }

    #[test]
    fn opening_close_to_now_is_extended_once() {
        let ends_at = NOW + 60;
        let o = open(ends_at, NOW, &config(), 30 * DAY).unwrap();
        assert_eq!(o.auction.ends_at, ends_at + 600);
        // Anchored on the requested end, not the extended one.
        assert_eq!(o.auction.extendable_until, ends_at + DAY);
        assert_eq!(o.expiration_time, ends_at + 30 * DAY);
    }

    #[test]
    fn ends_at_zero_or_past_rejected() {
        assert!(matches!(
            open(0, NOW, &config(), 30 * DAY),
            Err(EscrowError::EndsAtInPast { .. })
        ));
        assert!(matches!(
            open(NOW - 1, NOW, &config(), 30 * DAY),
            Err(EscrowError::EndsAtInPast { .. })
        ));
    }

    #[test]
    fn ends_at_must_be_strictly_after_now() {
        assert!(matches!(
            open(NOW, NOW, &config(), 30 * DAY),
            Err(EscrowError::EndsAtInPast { ends_at: NOW, now: NOW })
        ));
        let o = open(NOW + 1, NOW, &config(), 30 * DAY).unwrap();
        assert_eq!(o.auction.ends_at, NOW + 1 + 600);
    }

    #[test]
    fn ends_at_beyond_max_duration_rejected() {
        let max = NOW + constants::MAX_AUCTION_DURATION;
        assert!(open(max, NOW, &config(), 30 * DAY).is_ok());
        assert!(matches!(
            open(max + 1, NOW, &config(), 30 * DAY),
            Err(EscrowError::EndsAtTooFar { .. })
        ));
    }

    #[test]
    fn extension_margin_before_expiration() {
        let window = 30 * DAY;
        let ends_at = NOW + DAY;
        let mut cfg = config();

        cfg.extendable_by = window - 2 * HOUR + 1;
        assert!(matches!(
            open(ends_at, NOW, &cfg, window),
            Err(EscrowError::AuctionTooCloseToExpiration)
        ));

        cfg.extendable_by = window - 2 * HOUR - 1;
        assert!(open(ends_at, NOW, &cfg, window).is_ok());

        // Exactly the margin is still allowed.
        cfg.extendable_by = window - 2 * HOUR;
        assert!(open(ends_at, NOW, &cfg, window).is_ok());
    }

    #[test]
    fn late_bid_extends_by_time_to_extend() {
        let a = AuctionData {
            ends_at: NOW + 1_000,
            extendable_until: NOW + 1_000 + DAY,
        };
        // Outside the window: unchanged.
        assert_eq!(extended_ends_at(&a, NOW, 600), a.ends_at);
        assert_eq!(extended_ends_at(&a, NOW + 400, 600), a.ends_at);
        // Inside the window.
        assert_eq!(extended_ends_at(&a, NOW + 950, 600), a.ends_at + 600);
    }

    #[test]
    fn extension_capped_at_extendable_until() {
        let a = AuctionData {
            ends_at: NOW + 1_000,
            extendable_until: NOW + 1_200,
        };
        assert_eq!(extended_ends_at(&a, NOW + 950, 600), NOW + 1_200);

        let at_cap = AuctionData {
            ends_at: NOW + 1_200,
            extendable_until: NOW + 1_200,
        };
        assert_eq!(extended_ends_at(&at_cap, NOW + 1_150, 600), NOW + 1_200);
    }

    #[test]
    fn zero_time_to_extend_never_extends() {
        let a = AuctionData {
            ends_at: NOW + 10,
            extendable_until: NOW + DAY,
        };
        assert_eq!(extended_ends_at(&a, NOW + 9, 0), a.ends_at);
    }
}
