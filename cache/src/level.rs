use crate::basic::BasicCache;
use crate::capper::RequestCapperCache;
use crate::composed::ComposedCache;
use crate::conditioned::ConditionedCache;
use crate::error::BuildError;
use crate::pool::PoolCache;
use crate::switch::{SwitchCache, SwitchDestination};
use crate::transform::{KeyTransformCache, TwoWayTransformer, ValueTransformCache};

use strata::sequence::{merge_all, merge_some};
use strata::{Error, Future};

use std::hash::Hash;
use std::sync::Arc;

/// The capability set every cache level offers.
///
/// `get` and `set` surface their outcome exclusively through the returned
/// future and never fail synchronously; `clear` and `on_memory_warning` are
/// synchronous fire-and-forget. Any type implementing these four operations
/// composes with any other through the provided adapters, each of which
/// returns a concrete wrapper so chains stay nameable.
pub trait CacheLevel: Send + Sync + 'static {
  type Key: Send + 'static;
  type Value: Clone + Send + Sync + 'static;

  /// Fetches the value for `key`. A miss is a failure, not a panic.
  fn get(&self, key: Self::Key) -> Future<Self::Value>;

  /// Stores `value` under `key`, overwriting any previous entry.
  fn set(&self, value: Self::Value, key: Self::Key) -> Future<()>;

  /// Drops every entry.
  fn clear(&self);

  /// Reacts to memory pressure; levels holding only disk state may ignore
  /// it.
  fn on_memory_warning(&self);

  /// Layers `self` in front of `second`: reads fall back to `second` on
  /// failure and write the recovered value back into `self`.
  fn compose<B>(self, second: B) -> ComposedCache<Self, B>
  where
    Self: Sized,
    B: CacheLevel<Key = Self::Key, Value = Self::Value>,
    Self::Key: Clone,
  {
    ComposedCache::new(self, second)
  }

  /// Deduplicates concurrent `get`s for the same key into one upstream
  /// request.
  fn pooled(self) -> PoolCache<Self>
  where
    Self: Sized,
    Self::Key: Eq + Hash + Clone,
  {
    PoolCache::new(self)
  }

  /// Bounds the number of simultaneously in-flight `get`s to `cap`,
  /// queueing the excess in FIFO order.
  fn cap_requests(self, cap: usize) -> Result<RequestCapperCache<Self>, BuildError>
  where
    Self: Sized,
  {
    RequestCapperCache::new(self, cap)
  }

  /// Gates `get` and `set` behind an asynchronous predicate on the key.
  fn conditioned<F>(self, condition: F) -> ConditionedCache<Self, F>
  where
    Self: Sized,
    F: Fn(&Self::Key) -> Future<bool> + Send + Sync + 'static,
  {
    ConditionedCache::new(self, condition)
  }

  /// Exposes this level under a different key type; a transform failure
  /// fails the call without reaching the level.
  fn transform_keys<F, K>(self, transform: F) -> KeyTransformCache<Self, F, K>
  where
    Self: Sized,
    K: Send + 'static,
    F: Fn(K) -> Result<Self::Key, Error> + Send + Sync + 'static,
  {
    KeyTransformCache::new(self, transform)
  }

  /// Exposes this level under a different value type through a two-way
  /// transformer.
  fn transform_values<T>(self, transformer: T) -> ValueTransformCache<Self, T>
  where
    Self: Sized,
    T: TwoWayTransformer<Source = Self::Value>,
    T::Target: Clone + Send + Sync + 'static,
  {
    ValueTransformCache::new(self, transformer)
  }

  /// Routes every keyed operation to `self` or `second` based on a pure
  /// function of the key.
  fn switch_with<B, F>(self, second: B, router: F) -> SwitchCache<Self, B, F>
  where
    Self: Sized,
    B: CacheLevel<Key = Self::Key, Value = Self::Value>,
    F: Fn(&Self::Key) -> SwitchDestination + Send + Sync + 'static,
  {
    SwitchCache::new(self, second, router)
  }

  /// Erases the concrete level type into the canonical closure-built form.
  fn normalized(self) -> BasicCache<Self::Key, Self::Value>
  where
    Self: Sized,
  {
    let level = Arc::new(self);
    let get_level = Arc::clone(&level);
    let set_level = Arc::clone(&level);
    let clear_level = Arc::clone(&level);
    BasicCache::new(
      move |key| get_level.get(key),
      move |value, key| set_level.set(value, key),
      move || clear_level.clear(),
      move || level.on_memory_warning(),
    )
  }

  /// Fans `keys` out to concurrent `get`s; all-or-nothing, results in key
  /// order.
  fn get_all(&self, keys: Vec<Self::Key>) -> Future<Vec<Self::Value>> {
    merge_all(keys.into_iter().map(|key| self.get(key)).collect())
  }

  /// Fans `keys` out to concurrent `get`s, keeping only the hits, in key
  /// order.
  fn get_some(&self, keys: Vec<Self::Key>) -> Future<Vec<Self::Value>> {
    merge_some(keys.into_iter().map(|key| self.get(key)).collect())
  }
}

impl<L: CacheLevel> CacheLevel for Arc<L> {
  type Key = L::Key;
  type Value = L::Value;

  fn get(&self, key: Self::Key) -> Future<Self::Value> {
    (**self).get(key)
  }

  fn set(&self, value: Self::Value, key: Self::Key) -> Future<()> {
    (**self).set(value, key)
  }

  fn clear(&self) {
    (**self).clear();
  }

  fn on_memory_warning(&self) {
    (**self).on_memory_warning();
  }
}
