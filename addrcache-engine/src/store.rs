//! The ordered store: unique-by-address, ordered-by-recency.
//!
//! # Structure
//!
//! Recency order is kept as a `BTreeMap` keyed by a monotonically
//! increasing touch sequence, with an auxiliary `HashMap` from address to
//! its current sequence:
//!
//! - front (most recent) = highest sequence, back (oldest) = lowest
//! - move-to-front on re-offer is a remove plus reinsert under a fresh
//!   sequence, so the oldest end is always the true eviction candidate
//! - lookup, insert, and remove by address cost O(log n) instead of the
//!   linear scans a plain deque would need
//!
//! The store is not synchronized; `AddressCache` wraps it in a single
//! exclusive lock shared with the sweeper.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use addrcache_core::Address;

use crate::entry::CacheEntry;

#[derive(Debug)]
pub(crate) struct RecencyStore<A: Address> {
    /// Address → current touch sequence.
    index: HashMap<A, u64>,
    /// Touch sequence → entry, oldest first.
    order: BTreeMap<u64, CacheEntry<A>>,
    next_seq: u64,
}

impl<A: Address> RecencyStore<A> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            order: BTreeMap::new(),
            next_seq: 0,
        }
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Inserts the address at the most-recent end, or refreshes it if
    /// already present. Returns true when an existing entry was refreshed.
    ///
    /// Invariant maintained: at most one entry per distinct address, and
    /// age is monotonically non-increasing from back to front.
    pub fn offer(&mut self, address: A) -> bool {
        if let Some(seq) = self.index.get(&address).copied() {
            if let Some(mut entry) = self.order.remove(&seq) {
                entry.touch();
                let fresh = self.next_seq();
                self.index.insert(address, fresh);
                self.order.insert(fresh, entry);
                return true;
            }
        }
        let fresh = self.next_seq();
        self.index.insert(address.clone(), fresh);
        self.order.insert(fresh, CacheEntry::new(address));
        false
    }

    pub fn contains(&self, address: &A) -> bool {
        self.index.contains_key(address)
    }

    /// Removes the entry for this address, wherever it sits in the order.
    pub fn remove(&mut self, address: &A) -> bool {
        match self.index.remove(address) {
            Some(seq) => self.order.remove(&seq).is_some(),
            None => false,
        }
    }

    /// The most-recently-touched address, if any.
    pub fn peek_front(&self) -> Option<&A> {
        self.order.values().next_back().map(CacheEntry::address)
    }

    /// Removes and returns the most-recently-touched address.
    pub fn pop_front(&mut self) -> Option<A> {
        let (_, entry) = self.order.pop_last()?;
        self.index.remove(entry.address());
        Some(entry.into_address())
    }

    /// Evicts expired entries from the oldest end, stopping at the first
    /// entry that has not yet expired. Returns the evicted addresses in
    /// eviction order.
    ///
    /// Cost is O(evicted), not O(n): the recency order guarantees that
    /// once a non-expired entry is seen, nothing behind it can be older.
    pub fn evict_expired(&mut self, expiry: Duration) -> Vec<A> {
        let mut evicted = Vec::new();
        while let Some((_, entry)) = self.order.first_key_value() {
            if !entry.is_expired(expiry) {
                break;
            }
            if let Some((_, entry)) = self.order.pop_first() {
                self.index.remove(entry.address());
                evicted.push(entry.into_address());
            }
        }
        evicted
    }

    /// Addresses most-recent-first, for diagnostics.
    pub fn snapshot(&self) -> Vec<A> {
        self.order
            .values()
            .rev()
            .map(|e| e.address().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }
}
