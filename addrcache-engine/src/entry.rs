//! Cache entry: an address paired with its last-touched instant.

use std::time::{Duration, Instant};

use addrcache_core::Address;

/// An address plus the instant it was last inserted or refreshed.
///
/// Equality compares the address only and ignores the timestamp. That is
/// deliberate: it makes the entry usable as a dedup key, so "insert if
/// absent, else refresh recency" falls out of an equality lookup.
#[derive(Clone, Debug)]
pub(crate) struct CacheEntry<A: Address> {
    address: A,
    last_touched: Instant,
}

impl<A: Address> CacheEntry<A> {
    /// Creates an entry touched now.
    pub fn new(address: A) -> Self {
        Self {
            address,
            last_touched: Instant::now(),
        }
    }

    /// Resets the entry's age to zero.
    pub fn touch(&mut self) {
        self.last_touched = Instant::now();
    }

    /// Elapsed time since the last insertion or refresh.
    pub fn age(&self) -> Duration {
        self.last_touched.elapsed()
    }

    /// True once the entry's age meets or exceeds the expiry window.
    pub fn is_expired(&self, expiry: Duration) -> bool {
        self.age() >= expiry
    }

    pub fn address(&self) -> &A {
        &self.address
    }

    pub fn into_address(self) -> A {
        self.address
    }
}

impl<A: Address> PartialEq for CacheEntry<A> {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl<A: Address> Eq for CacheEntry<A> {}
