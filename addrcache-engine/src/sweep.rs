//! The background sweeper.
//!
//! One sweeper thread per cache instance. It owns no state of its own: on
//! every tick it takes the store's exclusive lock, evicts expired entries
//! from the oldest end, and goes back to sleep. `close()` stops it through
//! a flag plus a condvar wake rather than killing the thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace};

use addrcache_core::{Address, Result};

use crate::cache::Shared;

/// Spawns the sweeper thread for a cache instance.
///
/// The first sweep runs immediately; subsequent sweeps run once per
/// `interval` until the shared state is marked closed.
pub(crate) fn spawn<A: Address>(
    shared: Arc<Shared<A>>,
    expiry: Duration,
    interval: Duration,
) -> Result<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name("addrcache-sweeper".into())
        .spawn(move || run(shared, expiry, interval))?;
    Ok(handle)
}

fn run<A: Address>(shared: Arc<Shared<A>>, expiry: Duration, interval: Duration) {
    let mut state = shared.state.lock();
    loop {
        if state.closed {
            break;
        }

        // Incremental eviction: only entries at the oldest end can be
        // expired, so a burst costs O(evicted). An empty store is simply
        // nothing to evict, never an error.
        let evicted = state.store.evict_expired(expiry);
        if evicted.is_empty() {
            trace!("sweep found nothing expired");
        } else {
            state.stats.evicted += evicted.len() as u64;
            for address in &evicted {
                debug!(%address, "evicted expired entry");
            }
        }

        // The condvar releases the lock while parked; close() wakes us
        // early through sweeper_gate so shutdown never waits a full tick.
        let _ = shared.sweeper_gate.wait_for(&mut state, interval);
    }
    debug!("sweeper stopped");
}
