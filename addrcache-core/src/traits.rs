//! Common traits for addrcache.
//!
//! The cache never constructs or validates addresses; it only needs to
//! compare them, hash them for the dedup index, and display them in
//! diagnostics. Resolution of names to addresses is an external concern.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Bound that a cacheable address type must satisfy.
///
/// This is a trait alias with a blanket implementation: any type meeting
/// the bounds is an `Address`, so callers can cache `IpAddr`, `SocketAddr`,
/// or their own endpoint type without wrapper boilerplate.
///
/// Equality is the cache's notion of identity — two entries with equal
/// addresses are the same entry regardless of when they were touched.
pub trait Address: Clone + Eq + Hash + Debug + Display + Send + 'static {}

impl<T> Address for T where T: Clone + Eq + Hash + Debug + Display + Send + 'static {}
