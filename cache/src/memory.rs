use crate::cost::Cost;
use crate::error::{BuildError, CacheError};
use crate::level::CacheLevel;
use crate::lru::LruIndex;

use ahash::RandomState;
use parking_lot::Mutex;
use strata::{wrap, Future};
use tracing::debug;

use std::collections::HashMap;
use std::hash::Hash;

struct MemoryState<K, V> {
  entries: HashMap<K, V, RandomState>,
  index: LruIndex<K>,
}

/// An in-process, cost-bounded LRU store.
///
/// `get` and `set` resolve synchronously on the calling thread; both
/// refresh the entry's recency. When the accumulated cost exceeds the
/// configured capacity, least-recently-used entries are evicted until it
/// fits again (the entry just written is never its own victim). Memory
/// pressure empties the store.
pub struct MemoryCacheLevel<K, V> {
  capacity: u64,
  state: Mutex<MemoryState<K, V>>,
}

impl<K, V> MemoryCacheLevel<K, V>
where
  K: Eq + Hash + Clone,
{
  pub fn new(capacity: u64) -> Result<Self, BuildError> {
    if capacity == 0 {
      return Err(BuildError::ZeroCapacity);
    }
    Ok(MemoryCacheLevel {
      capacity,
      state: Mutex::new(MemoryState {
        entries: HashMap::default(),
        index: LruIndex::new(),
      }),
    })
  }

  /// Current accumulated cost, for inspection.
  pub fn total_cost(&self) -> u64 {
    self.state.lock().index.total()
  }
}

impl<K, V> CacheLevel for MemoryCacheLevel<K, V>
where
  K: Eq + Hash + Clone + Send + 'static,
  V: Cost + Clone + Send + Sync + 'static,
{
  type Key = K;
  type Value = V;

  fn get(&self, key: K) -> Future<V> {
    let mut state = self.state.lock();
    match state.entries.get(&key) {
      Some(value) => {
        let value = value.clone();
        state.index.touch(&key);
        Future::of(value)
      }
      None => Future::failed(wrap(CacheError::ValueNotInCache)),
    }
  }

  fn set(&self, value: V, key: K) -> Future<()> {
    let mut state = self.state.lock();
    let cost = value.cost();
    state.entries.insert(key.clone(), value);
    state.index.insert(key, cost);

    let evicted = state.index.evict_over_capacity(self.capacity);
    if !evicted.is_empty() {
      debug!("evicting {} entries over capacity", evicted.len());
      for victim in &evicted {
        state.entries.remove(victim);
      }
    }

    Future::of(())
  }

  fn clear(&self) {
    let mut state = self.state.lock();
    state.entries.clear();
    state.index.clear();
  }

  fn on_memory_warning(&self) {
    // Memory pressure is a forced clear for this level.
    self.clear();
  }
}
