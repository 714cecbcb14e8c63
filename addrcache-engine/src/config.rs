//! Cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use addrcache_core::{CacheError, Result, DEFAULT_EXPIRY_MS, DEFAULT_SWEEP_INTERVAL_MS};

/// Cache configuration.
///
/// The defaults give a 5-second expiry window swept on a 5-second period.
/// [`AddressCache::new`](crate::AddressCache::new) only exposes the expiry;
/// the sweep interval is adjustable here mainly so tests can compress the
/// timing scenarios.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Expiry window in milliseconds; an entry is evictable once its age
    /// meets or exceeds this.
    pub expiry_ms: u64,
    /// Sweep period in milliseconds. The first sweep runs at time zero.
    pub sweep_interval_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiry_ms: DEFAULT_EXPIRY_MS,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
        }
    }
}

impl CacheConfig {
    /// Creates a configuration with the given expiry window and the fixed
    /// default sweep interval.
    pub fn with_expiry(expiry: Duration) -> Self {
        Self {
            expiry_ms: expiry.as_millis() as u64,
            ..Self::default()
        }
    }

    /// The expiry window as a `Duration`.
    pub fn expiry(&self) -> Duration {
        Duration::from_millis(self.expiry_ms)
    }

    /// The sweep period as a `Duration`.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Validates the configuration.
    ///
    /// Both durations must be non-zero: a zero sweep interval would spin
    /// the sweeper, and a zero expiry window makes every entry dead on
    /// arrival.
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval_ms == 0 {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be non-zero".into(),
            ));
        }
        if self.expiry_ms == 0 {
            return Err(CacheError::InvalidConfig(
                "expiry window must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
