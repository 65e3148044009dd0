//! Timing and validation constants for the attendance endpoint.
//!
//! These values mirror the behavior of the deployed firmware: a short scan
//! cooldown, a 30-second heartbeat, and a fixed 5-second reconnect interval.
//! They are defaults; the CLI configuration can override the timing values
//! per installation.

/// Cooldown window for repeated reads of the same tag, in milliseconds.
///
/// A second presentation of the same card inside this window is treated as
/// reader chatter, not a new attendance intent, and is suppressed.
pub const SCAN_COOLDOWN_MS: u64 = 3000;

/// Interval between heartbeat publications, in milliseconds.
pub const HEARTBEAT_INTERVAL_MS: u64 = 30_000;

/// Delay between controller loop iterations, in milliseconds.
///
/// The loop is cooperative: every peripheral poll is non-blocking, so this
/// delay bounds both CPU usage and worst-case input latency.
pub const TICK_DELAY_MS: u64 = 100;

/// Fixed interval between broker reconnection attempts, in milliseconds.
///
/// The retry policy is intentionally flat (no backoff growth) and unbounded:
/// an always-on endpoint has nothing better to do than keep trying. The only
/// escape hatch is physical reset.
pub const RETRY_INTERVAL_MS: u64 = 5000;

/// Minimum tag UID length in bytes (per ISO 14443).
pub const MIN_TAG_LENGTH: usize = 4;

/// Maximum tag UID length in bytes (per ISO 14443).
pub const MAX_TAG_LENGTH: usize = 10;

/// Milliseconds per synthetic hour.
pub const MS_PER_HOUR: u64 = 3_600_000;

/// Hour of the synthetic day at which classification flips from check-in
/// to check-out.
pub const CHECKOUT_HOUR: u64 = 12;
