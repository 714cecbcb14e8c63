//! # addrcache Core
//!
//! Core traits, errors, and constants for the addrcache recency cache.
//!
//! This crate provides the foundational building blocks used by the other
//! addrcache crates:
//!
//! - **Traits**: The [`Address`] bound an entry key must satisfy
//! - **Errors**: The cache error taxonomy ([`CacheError`])
//! - **Constants**: Default expiry window and sweep interval
//!
//! The cache itself lives in `addrcache-engine`; this crate only defines
//! the vocabulary shared between the engine and its callers.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{CacheError, Result};
pub use traits::Address;
