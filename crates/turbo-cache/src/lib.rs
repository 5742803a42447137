//! In-process TTL key-value cache for TurboCommerce.
//!
//! Entries expire a fixed time after they are written. Time comes from an
//! injectable [`Clock`], so callers can drive expiry deterministically in
//! tests.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use turbo_cache::{cache_key, Cache, ManualClock};
//!
//! let clock = Arc::new(ManualClock::new());
//! let cache: Cache<u64> = Cache::with_clock(Duration::from_secs(60), clock.clone());
//!
//! let key = cache_key!("low-stock", "prod-1");
//! assert!(cache.insert_if_absent(&key, 1));
//! assert!(!cache.insert_if_absent(&key, 2));
//!
//! clock.advance(Duration::from_secs(61));
//! assert!(cache.get(&key).is_none());
//! ```

mod clock;
mod kv;

pub use clock::{Clock, ManualClock, SystemClock};
pub use kv::Cache;
