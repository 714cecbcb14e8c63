//! Default timing constants for addrcache.
//!
//! A cache configured with only an expiry window sweeps on a fixed
//! 5-second period.

/// Default expiry window in milliseconds.
///
/// An entry whose age meets or exceeds this value is eligible for eviction
/// at the next sweep.
pub const DEFAULT_EXPIRY_MS: u64 = 5_000;

/// Fixed sweep interval in milliseconds.
///
/// The background sweeper runs once immediately at creation and then on
/// this period. Not exposed through the single-argument constructor.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 5_000;
