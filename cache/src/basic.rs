use crate::level::CacheLevel;

use strata::Future;

use std::sync::Arc;

/// The canonical closure-built cache level.
///
/// Every adapter in this crate can be erased into a `BasicCache` via
/// [`CacheLevel::normalized`], which keeps arbitrarily deep compositions
/// nameable as a single type.
pub struct BasicCache<K, V> {
  get_fn: Arc<dyn Fn(K) -> Future<V> + Send + Sync>,
  set_fn: Arc<dyn Fn(V, K) -> Future<()> + Send + Sync>,
  clear_fn: Arc<dyn Fn() + Send + Sync>,
  warning_fn: Arc<dyn Fn() + Send + Sync>,
}

impl<K, V> BasicCache<K, V> {
  pub fn new<G, S, C, W>(get: G, set: S, clear: C, on_memory_warning: W) -> Self
  where
    G: Fn(K) -> Future<V> + Send + Sync + 'static,
    S: Fn(V, K) -> Future<()> + Send + Sync + 'static,
    C: Fn() + Send + Sync + 'static,
    W: Fn() + Send + Sync + 'static,
  {
    BasicCache {
      get_fn: Arc::new(get),
      set_fn: Arc::new(set),
      clear_fn: Arc::new(clear),
      warning_fn: Arc::new(on_memory_warning),
    }
  }
}

impl<K, V> Clone for BasicCache<K, V> {
  fn clone(&self) -> Self {
    BasicCache {
      get_fn: Arc::clone(&self.get_fn),
      set_fn: Arc::clone(&self.set_fn),
      clear_fn: Arc::clone(&self.clear_fn),
      warning_fn: Arc::clone(&self.warning_fn),
    }
  }
}

impl<K, V> CacheLevel for BasicCache<K, V>
where
  K: Send + 'static,
  V: Clone + Send + Sync + 'static,
{
  type Key = K;
  type Value = V;

  fn get(&self, key: K) -> Future<V> {
    (self.get_fn)(key)
  }

  fn set(&self, value: V, key: K) -> Future<()> {
    (self.set_fn)(value, key)
  }

  fn clear(&self) {
    (self.clear_fn)();
  }

  fn on_memory_warning(&self) {
    (self.warning_fn)();
  }
}
