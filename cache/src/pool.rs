use crate::level::CacheLevel;

use ahash::RandomState;
use parking_lot::Mutex;
use strata::{Future, Promise};

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Deduplicates concurrent reads so at most one `get` per distinct key is
/// in flight against the wrapped level at any time.
///
/// Writes are intentionally not deduplicated: two overlapping `set` calls
/// for the same key both reach the wrapped level.
pub struct PoolCache<C: CacheLevel> {
  inner: Arc<C>,
  in_flight: Arc<Mutex<HashMap<C::Key, Future<C::Value>, RandomState>>>,
}

impl<C> PoolCache<C>
where
  C: CacheLevel,
  C::Key: Eq + Hash + Clone,
{
  pub fn new(inner: C) -> Self {
    PoolCache {
      inner: Arc::new(inner),
      in_flight: Arc::new(Mutex::new(HashMap::default())),
    }
  }
}

impl<C> Clone for PoolCache<C>
where
  C: CacheLevel,
{
  fn clone(&self) -> Self {
    PoolCache {
      inner: Arc::clone(&self.inner),
      in_flight: Arc::clone(&self.in_flight),
    }
  }
}

impl<C> CacheLevel for PoolCache<C>
where
  C: CacheLevel,
  C::Key: Eq + Hash + Clone,
{
  type Key = C::Key;
  type Value = C::Value;

  fn get(&self, key: Self::Key) -> Future<Self::Value> {
    let promise = Promise::new();

    let shared = {
      let mut registry = self.in_flight.lock();
      match registry.get(&key) {
        Some(pending) => Some(pending.clone()),
        None => {
          registry.insert(key.clone(), promise.future());
          None
        }
      }
    };

    match shared {
      Some(pending) => {
        // Join the request already in flight for this key.
        promise.mimic(&pending);
      }
      None => {
        let registry = Arc::clone(&self.in_flight);
        let registered = key.clone();
        // Registered before the upstream settles so the entry is gone by
        // the time any subscriber observes the outcome.
        promise.future().on_completion(move |_| {
          registry.lock().remove(&registered);
        });

        let upstream = self.inner.get(key);
        promise.mimic(&upstream);
      }
    }

    promise.future()
  }

  fn set(&self, value: Self::Value, key: Self::Key) -> Future<()> {
    self.inner.set(value, key)
  }

  fn clear(&self) {
    self.inner.clear();
  }

  fn on_memory_warning(&self) {
    self.inner.on_memory_warning();
  }
}
