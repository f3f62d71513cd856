//! Protocol-wide constants for Escrowpay.
//!
//! All durations are in seconds; all fees are in basis points.

/// One hour in seconds.
pub const HOUR: u64 = 3600;

/// One day in seconds.
pub const DAY: u64 = 24 * HOUR;

/// Basis-point denominator: 10 000 bps = 100%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Fee cap applied when no universe-specific cap is set.
pub const DEFAULT_MAX_FEE_BPS: u32 = BPS_DENOMINATOR;

/// Shortest allowed payment window.
pub const MIN_PAYMENT_WINDOW: u64 = 3 * HOUR;

/// Longest allowed payment window.
pub const MAX_PAYMENT_WINDOW: u64 = 60 * DAY;

/// Payment window at deployment.
pub const DEFAULT_PAYMENT_WINDOW: u64 = 30 * DAY;

/// Default minimum bid increase: 5%.
pub const DEFAULT_MIN_INCREASE_BPS: u32 = 500;

/// Default anti-snipe extension applied to late bids.
pub const DEFAULT_TIME_TO_EXTEND: u64 = 10 * 60;

/// Default ceiling on how far an auction can be pushed past its first end.
pub const DEFAULT_EXTENDABLE_BY: u64 = DAY;

/// Largest `extendable_by` an auction config may carry.
pub const MAX_EXTENDABLE_BY: u64 = 2 * DAY;

/// Minimum slack between `extendable_until` and the payment expiration.
pub const AUCTION_EXPIRATION_MARGIN: u64 = 2 * HOUR;

/// Furthest in the future a first bid may place `ends_at`.
pub const MAX_AUCTION_DURATION: u64 = 60 * DAY;

/// Protocol version string embedded in every signing domain.
pub const DOMAIN_VERSION: &str = "1";

/// Signing-domain name for the native-coin rail.
pub const NATIVE_DOMAIN_NAME: &str = "Escrowpay Native Payments";

/// Signing-domain name for the token rail.
pub const TOKEN_DOMAIN_NAME: &str = "Escrowpay Token Payments";
