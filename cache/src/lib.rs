//! Composable cache levels over [`strata`] futures.
//!
//! Everything here is an implementation of one capability set — `get`,
//! `set`, `clear`, `on_memory_warning` — expressed as the [`CacheLevel`]
//! trait. Concrete stores ([`MemoryCacheLevel`], [`DiskCacheLevel`]) and
//! behavioral wrappers (fallback composition with write-back, request
//! pooling, concurrency capping, key/value transformation, conditional
//! gating, key-based switching) all speak it, so any stack of them
//! composes with any other and can be erased back into a single
//! [`BasicCache`] when the concrete type gets unwieldy.
//!
//! Outcomes travel exclusively through the future channel: a miss is a
//! failure, cancellation is terminal and distinct from failure, and no
//! operation fails synchronously.
//!
//! # Examples
//!
//! ```
//! use strata_cache::{CacheLevel, MemoryCacheLevel};
//!
//! let fronting = MemoryCacheLevel::<String, String>::new(1024).unwrap();
//! let backing = MemoryCacheLevel::<String, String>::new(64 * 1024).unwrap();
//! let stack = fronting.compose(backing);
//!
//! stack.set("value".to_string(), "key".to_string());
//! let hit = stack.get("key".to_string()).wait();
//! assert_eq!(hit.into_value().as_deref(), Some("value"));
//! ```

pub mod error;

mod basic;
mod capper;
mod composed;
mod conditioned;
mod cost;
mod disk;
mod level;
mod lru;
mod memory;
mod pool;
mod switch;
mod task;
mod transform;

pub use basic::BasicCache;
pub use capper::RequestCapperCache;
pub use composed::ComposedCache;
pub use conditioned::ConditionedCache;
pub use cost::Cost;
pub use disk::DiskCacheLevel;
pub use error::{is_cache_error, BuildError, CacheError};
pub use level::CacheLevel;
pub use memory::MemoryCacheLevel;
pub use pool::PoolCache;
pub use switch::{SwitchCache, SwitchDestination};
pub use transform::{BasicTransformer, KeyTransformCache, TwoWayTransformer, ValueTransformCache};
