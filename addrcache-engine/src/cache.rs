//! The public cache engine.
//!
//! A single exclusive lock guards the ordered store; the background
//! sweeper and all foreground operations serialize on it, so no operation
//! ever observes a half-applied mutation. Two condvars hang off the lock:
//! `available` parks blocking `take` callers, `sweeper_gate` paces the
//! sweeper between ticks. Both are woken on close.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};
use serde::Serialize;
use tracing::debug;

use addrcache_core::{Address, CacheError, Result};

use crate::config::CacheConfig;
use crate::store::RecencyStore;
use crate::sweep;

/// Cache statistics: the current entry count plus monotonic operation
/// counters maintained under the store lock.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CacheStats {
    /// Entries currently in the store.
    pub entries: usize,
    /// Total `offer` calls accepted.
    pub offered: u64,
    /// Offers that refreshed an existing entry instead of inserting.
    pub refreshed: u64,
    /// Entries evicted by the background sweeper.
    pub evicted: u64,
    /// Entries removed by address.
    pub removed: u64,
    /// Entries handed out through `pop` or `take`.
    pub taken: u64,
}

pub(crate) struct CacheState<A: Address> {
    pub store: RecencyStore<A>,
    pub stats: CacheStats,
    pub closed: bool,
}

pub(crate) struct Shared<A: Address> {
    pub state: Mutex<CacheState<A>>,
    /// Parks `take` waiters; notified on offer, close, and cancellation.
    pub available: Condvar,
    /// Paces the sweeper between ticks; notified on close.
    pub sweeper_gate: Condvar,
}

/// Type-erased wake channel so `CancelToken` need not be generic over the
/// address type.
trait WakeWaiters: Send + Sync {
    fn wake_waiters(&self);
}

impl<A: Address> WakeWaiters for Shared<A> {
    fn wake_waiters(&self) {
        self.available.notify_all();
    }
}

/// Cancellation handle for [`AddressCache::take_cancellable`].
///
/// Cloneable; cancelling any clone cancels them all. Cancellation wakes
/// every parked waiter so those holding this token can fail with
/// `Interrupted` while unrelated waiters go back to sleep.
#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    waker: Arc<dyn WakeWaiters>,
}

impl CancelToken {
    /// Requests cancellation and wakes parked waiters.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.waker.wake_waiters();
    }

    /// True once `cancel` has been called on any clone of this token.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Thread-safe, time-bounded cache of recently used addresses.
///
/// Entries are unique by address and ordered by recency of
/// insertion-or-refresh. A background sweeper evicts entries from the
/// oldest end once their age reaches the expiry window; `peek`, `pop`,
/// and `take` operate on the most-recent end.
///
/// All operations fail with `CacheError::Closed` after [`close`]
/// (`AddressCache::close`); dropping the cache closes it as well.
pub struct AddressCache<A: Address> {
    shared: Arc<Shared<A>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
    config: CacheConfig,
}

impl<A: Address> AddressCache<A> {
    /// Creates a cache with the given expiry window and the fixed default
    /// sweep interval, and starts its background sweeper.
    pub fn new(expiry: Duration) -> Result<Self> {
        Self::with_config(CacheConfig::with_expiry(expiry))
    }

    /// Creates a cache from a validated configuration.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let shared = Arc::new(Shared {
            state: Mutex::new(CacheState {
                store: RecencyStore::new(),
                stats: CacheStats::default(),
                closed: false,
            }),
            available: Condvar::new(),
            sweeper_gate: Condvar::new(),
        });
        let handle = sweep::spawn(Arc::clone(&shared), config.expiry(), config.sweep_interval())?;
        debug!(
            expiry_ms = config.expiry_ms,
            sweep_interval_ms = config.sweep_interval_ms,
            "cache created"
        );
        Ok(Self {
            shared,
            sweeper: Mutex::new(Some(handle)),
            config,
        })
    }

    /// The configuration this cache was created with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Takes the store lock, failing if the cache is closed.
    ///
    /// Every operation goes through here, which is what makes races with
    /// `close` deterministic: a caller either sees the pre-close store or
    /// fails with `Closed`, never a store mid-teardown.
    fn lock_open(&self) -> Result<MutexGuard<'_, CacheState<A>>> {
        let state = self.shared.state.lock();
        if state.closed {
            return Err(CacheError::Closed);
        }
        Ok(state)
    }

    /// Inserts the address at the most-recent end, or refreshes its
    /// recency if already present.
    ///
    /// Always returns `Ok(true)` while the cache is open: insertion never
    /// fails for a well-formed address. Wakes one blocked `take` caller.
    pub fn offer(&self, address: A) -> Result<bool> {
        let mut state = self.lock_open()?;
        let refreshed = state.store.offer(address);
        state.stats.offered += 1;
        if refreshed {
            state.stats.refreshed += 1;
        }
        drop(state);
        self.shared.available.notify_one();
        Ok(true)
    }

    /// True if an entry with this address is present.
    pub fn contains(&self, address: &A) -> Result<bool> {
        Ok(self.lock_open()?.store.contains(address))
    }

    /// Removes the entry with this address; returns whether one existed.
    pub fn remove(&self, address: &A) -> Result<bool> {
        let mut state = self.lock_open()?;
        let removed = state.store.remove(address);
        if removed {
            state.stats.removed += 1;
        }
        Ok(removed)
    }

    /// The most-recently-touched address, without removing it. `Ok(None)`
    /// on an empty store is a normal outcome, not a failure.
    pub fn peek(&self) -> Result<Option<A>> {
        Ok(self.lock_open()?.store.peek_front().cloned())
    }

    /// Removes and returns the most-recently-touched address, or
    /// `Ok(None)` if the store is empty. Never blocks.
    pub fn pop(&self) -> Result<Option<A>> {
        let mut state = self.lock_open()?;
        let popped = state.store.pop_front();
        if popped.is_some() {
            state.stats.taken += 1;
        }
        Ok(popped)
    }

    /// Blocks until an entry is present, then removes and returns the
    /// most-recently-touched address.
    ///
    /// Fails with `Closed` if the cache is closed before an entry
    /// arrives. For a wait that can be abandoned, use
    /// [`take_cancellable`](Self::take_cancellable).
    pub fn take(&self) -> Result<A> {
        self.take_inner(None)
    }

    /// Like [`take`](Self::take), but also fails with `Interrupted` once
    /// the token is cancelled, without consuming an entry.
    pub fn take_cancellable(&self, token: &CancelToken) -> Result<A> {
        self.take_inner(Some(token))
    }

    fn take_inner(&self, token: Option<&CancelToken>) -> Result<A> {
        let mut state = self.shared.state.lock();
        loop {
            if state.closed {
                return Err(CacheError::Closed);
            }
            if token.is_some_and(CancelToken::is_cancelled) {
                return Err(CacheError::Interrupted);
            }
            if let Some(address) = state.store.pop_front() {
                state.stats.taken += 1;
                return Ok(address);
            }
            self.shared.available.wait(&mut state);
        }
    }

    /// Creates a cancellation token tied to this cache's waiters.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken {
            cancelled: Arc::new(AtomicBool::new(false)),
            waker: Arc::clone(&self.shared) as Arc<dyn WakeWaiters>,
        }
    }

    /// Number of entries currently in the store.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock_open()?.store.len())
    }

    /// True if the store holds no entries.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock_open()?.store.is_empty())
    }

    /// Addresses most-recent-first, for diagnostics.
    pub fn snapshot(&self) -> Result<Vec<A>> {
        Ok(self.lock_open()?.store.snapshot())
    }

    /// Current statistics.
    pub fn stats(&self) -> Result<CacheStats> {
        let state = self.lock_open()?;
        let mut stats = state.stats.clone();
        stats.entries = state.store.len();
        Ok(stats)
    }

    /// True once the cache has been closed.
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Halts the background sweeper and discards all entries.
    ///
    /// Idempotent: closing an already-closed cache is a no-op. The
    /// sweeper thread has fully stopped by the time the closing call
    /// returns; subsequent operations fail with `Closed`.
    pub fn close(&self) {
        {
            let mut state = self.shared.state.lock();
            if !state.closed {
                state.closed = true;
                state.store.clear();
                self.shared.sweeper_gate.notify_all();
                self.shared.available.notify_all();
                debug!("cache closed");
            }
        }
        // Join outside the lock so the sweeper can reacquire it and exit.
        if let Some(handle) = self.sweeper.lock().take() {
            let _ = handle.join();
        }
    }
}

impl<A: Address> Drop for AddressCache<A> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::thread;

    fn addr(n: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(27, 0, 0, n))
    }

    /// Short timings so sweep scenarios run in well under a second; the
    /// margins are several sweep intervals wide to ride out scheduler
    /// jitter.
    fn fast_cache() -> AddressCache<IpAddr> {
        AddressCache::with_config(CacheConfig {
            expiry_ms: 200,
            sweep_interval_ms: 50,
        })
        .unwrap()
    }

    /// Expiry long enough that no sweep interferes with the test body.
    fn slow_cache() -> AddressCache<IpAddr> {
        AddressCache::new(Duration::from_secs(60)).unwrap()
    }

    fn populate(cache: &AddressCache<IpAddr>, n: u8) {
        for i in 1..=n {
            cache.offer(addr(i)).unwrap();
        }
    }

    #[test]
    fn test_offer_changes_size() {
        let cache = slow_cache();
        assert_eq!(cache.len().unwrap(), 0);
        cache.offer(addr(1)).unwrap();
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_offer_returns_true() {
        let cache = slow_cache();
        assert!(cache.offer(addr(1)).unwrap());
        // re-offer of a present address also succeeds
        assert!(cache.offer(addr(1)).unwrap());
    }

    #[test]
    fn test_offer_deduplicates() {
        let cache = slow_cache();
        populate(&cache, 5);
        cache.offer(addr(3)).unwrap();
        assert_eq!(cache.len().unwrap(), 5);
    }

    #[test]
    fn test_contains_present_and_absent() {
        let cache = slow_cache();
        assert!(!cache.contains(&addr(1)).unwrap());
        cache.offer(addr(1)).unwrap();
        assert!(cache.contains(&addr(1)).unwrap());
        assert!(!cache.contains(&addr(2)).unwrap());
    }

    #[test]
    fn test_remove_by_address() {
        let cache = slow_cache();
        populate(&cache, 3);
        assert!(cache.remove(&addr(2)).unwrap());
        assert!(!cache.contains(&addr(2)).unwrap());
        assert_eq!(cache.len().unwrap(), 2);
    }

    #[test]
    fn test_remove_absent_address_returns_false() {
        let cache = slow_cache();
        populate(&cache, 3);
        assert!(!cache.remove(&addr(9)).unwrap());
        assert_eq!(cache.len().unwrap(), 3);
    }

    #[test]
    fn test_peek_empty_returns_none() {
        let cache = slow_cache();
        assert_eq!(cache.peek().unwrap(), None);
    }

    #[test]
    fn test_peek_returns_most_recent_without_removing() {
        let cache = slow_cache();
        populate(&cache, 5);
        assert_eq!(cache.peek().unwrap(), Some(addr(5)));
        assert_eq!(cache.len().unwrap(), 5);
    }

    #[test]
    fn test_pop_empty_returns_none() {
        let cache = slow_cache();
        assert_eq!(cache.pop().unwrap(), None);
    }

    #[test]
    fn test_pop_returns_most_recent_and_shrinks() {
        let cache = slow_cache();
        populate(&cache, 5);
        assert_eq!(cache.pop().unwrap(), Some(addr(5)));
        assert_eq!(cache.len().unwrap(), 4);
    }

    #[test]
    fn test_reoffer_moves_to_front() {
        // offer(A), offer(B), offer(A): size 2, peek == A
        let cache = slow_cache();
        cache.offer(addr(1)).unwrap();
        cache.offer(addr(2)).unwrap();
        cache.offer(addr(1)).unwrap();
        assert_eq!(cache.len().unwrap(), 2);
        assert_eq!(cache.peek().unwrap(), Some(addr(1)));
    }

    #[test]
    fn test_take_returns_most_recent_when_nonempty() {
        let cache = slow_cache();
        populate(&cache, 5);
        assert_eq!(cache.take().unwrap(), addr(5));
        assert_eq!(cache.len().unwrap(), 4);
    }

    #[test]
    fn test_take_blocks_until_offer() {
        let cache = Arc::new(slow_cache());
        let waiter = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.take())
        };

        thread::sleep(Duration::from_millis(100));
        cache.offer(addr(7)).unwrap();

        let taken = waiter.join().unwrap().unwrap();
        assert_eq!(taken, addr(7));
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_take_cancellation_interrupts_waiter() {
        let cache = Arc::new(slow_cache());
        let token = cache.cancel_token();
        let waiter = {
            let cache = Arc::clone(&cache);
            let token = token.clone();
            thread::spawn(move || cache.take_cancellable(&token))
        };

        thread::sleep(Duration::from_millis(100));
        token.cancel();

        let err = waiter.join().unwrap().unwrap_err();
        assert!(matches!(err, CacheError::Interrupted));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_take_with_already_cancelled_token_never_consumes() {
        let cache = slow_cache();
        cache.offer(addr(1)).unwrap();
        let token = cache.cancel_token();
        token.cancel();
        assert!(matches!(
            cache.take_cancellable(&token),
            Err(CacheError::Interrupted)
        ));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_close_unblocks_waiter_with_closed() {
        let cache = Arc::new(slow_cache());
        let waiter = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.take())
        };

        thread::sleep(Duration::from_millis(100));
        cache.close();

        assert!(matches!(
            waiter.join().unwrap(),
            Err(CacheError::Closed)
        ));
    }

    #[test]
    fn test_close_is_idempotent_and_rejects_operations() {
        let cache = slow_cache();
        populate(&cache, 3);
        cache.close();
        cache.close();
        assert!(cache.is_closed());

        assert!(matches!(cache.offer(addr(1)), Err(CacheError::Closed)));
        assert!(matches!(cache.contains(&addr(1)), Err(CacheError::Closed)));
        assert!(matches!(cache.remove(&addr(1)), Err(CacheError::Closed)));
        assert!(matches!(cache.peek(), Err(CacheError::Closed)));
        assert!(matches!(cache.pop(), Err(CacheError::Closed)));
        assert!(matches!(cache.take(), Err(CacheError::Closed)));
        assert!(matches!(cache.len(), Err(CacheError::Closed)));
        assert!(matches!(cache.is_empty(), Err(CacheError::Closed)));
        assert!(matches!(cache.snapshot(), Err(CacheError::Closed)));
        assert!(matches!(cache.stats(), Err(CacheError::Closed)));
    }

    #[test]
    fn test_sweep_evicts_expired_entries() {
        // Scenario A at compressed scale: all entries age past the window
        // and several sweep ticks pass.
        let cache = fast_cache();
        populate(&cache, 5);
        assert_eq!(cache.len().unwrap(), 5);

        thread::sleep(Duration::from_millis(600));
        assert_eq!(cache.len().unwrap(), 0);

        let stats = cache.stats().unwrap();
        assert_eq!(stats.evicted, 5);
    }

    #[test]
    fn test_sweep_leaves_fresh_entries() {
        // Scenario B: an entry younger than the window survives sweeps.
        let cache = fast_cache();
        cache.offer(addr(1)).unwrap();
        thread::sleep(Duration::from_millis(100));
        assert_eq!(cache.len().unwrap(), 1);

        thread::sleep(Duration::from_millis(500));
        assert_eq!(cache.len().unwrap(), 0);
    }

    #[test]
    fn test_refresh_restarts_expiry_clock() {
        let cache = fast_cache();
        cache.offer(addr(1)).unwrap();
        // keep the entry fresh across several sweep ticks
        for _ in 0..4 {
            thread::sleep(Duration::from_millis(100));
            cache.offer(addr(1)).unwrap();
        }
        assert_eq!(cache.len().unwrap(), 1);

        thread::sleep(Duration::from_millis(600));
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_concurrent_offers_preserve_uniqueness() {
        let cache = Arc::new(slow_cache());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for round in 0u8..50 {
                    cache.offer(addr(round % 10 + 1)).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        // 4 threads × 50 offers over 10 distinct addresses
        assert_eq!(cache.len().unwrap(), 10);
        let stats = cache.stats().unwrap();
        assert_eq!(stats.offered, 200);
        assert_eq!(stats.refreshed, 190);
    }

    #[test]
    fn test_stats_counters() {
        let cache = slow_cache();
        populate(&cache, 3);
        cache.offer(addr(1)).unwrap();
        cache.remove(&addr(2)).unwrap();
        cache.pop().unwrap();

        let stats = cache.stats().unwrap();
        assert_eq!(stats.offered, 4);
        assert_eq!(stats.refreshed, 1);
        assert_eq!(stats.removed, 1);
        assert_eq!(stats.taken, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_snapshot_orders_most_recent_first() {
        let cache = slow_cache();
        populate(&cache, 3);
        assert_eq!(cache.snapshot().unwrap(), vec![addr(3), addr(2), addr(1)]);
    }
}
