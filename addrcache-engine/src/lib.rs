//! # addrcache Engine
//!
//! A thread-safe cache of recently used network addresses, bounded by time
//! rather than capacity: entries expire once they have aged past a fixed
//! window, and a background sweeper evicts them on a fixed period.
//!
//! ## Semantics
//!
//! - **Unique by address**: offering an address already present refreshes
//!   its recency instead of inserting a duplicate.
//! - **Ordered by recency**: `peek`/`pop`/`take` operate on the
//!   most-recently-touched end; the sweeper evicts from the oldest end.
//! - **Blocking take**: `take` suspends until an entry is available, and
//!   can be cancelled through a [`CancelToken`].
//! - **Explicit close**: after [`AddressCache::close`], every operation
//!   fails with [`CacheError::Closed`](addrcache_core::CacheError::Closed)
//!   rather than panicking or silently no-opping.
//!
//! ## Example
//!
//! ```rust
//! use std::net::{IpAddr, Ipv4Addr};
//! use addrcache_engine::AddressCache;
//!
//! let cache = AddressCache::new(std::time::Duration::from_secs(5))?;
//! let addr = IpAddr::V4(Ipv4Addr::new(27, 0, 0, 1));
//!
//! cache.offer(addr)?;
//! assert_eq!(cache.peek()?, Some(addr));
//! cache.close();
//! # Ok::<(), addrcache_core::CacheError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod config;
mod entry;
mod store;
mod sweep;

pub use cache::{AddressCache, CacheStats, CancelToken};
pub use config::CacheConfig;
