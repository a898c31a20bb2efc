use crate::level::CacheLevel;

use strata::Future;

/// Where a [`SwitchCache`] routes a given key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchDestination {
  Primary,
  Secondary,
}

/// Routes keyed operations to one of two sub-levels via a pure function of
/// the key. `clear` and `on_memory_warning` broadcast to both.
pub struct SwitchCache<A, B, F> {
  primary: A,
  secondary: B,
  router: F,
}

impl<A, B, F> SwitchCache<A, B, F>
where
  A: CacheLevel,
  B: CacheLevel<Key = A::Key, Value = A::Value>,
  F: Fn(&A::Key) -> SwitchDestination + Send + Sync + 'static,
{
  pub fn new(primary: A, secondary: B, router: F) -> Self {
    SwitchCache {
      primary,
      secondary,
      router,
    }
  }
}

impl<A, B, F> CacheLevel for SwitchCache<A, B, F>
where
  A: CacheLevel,
  B: CacheLevel<Key = A::Key, Value = A::Value>,
  F: Fn(&A::Key) -> SwitchDestination + Send + Sync + 'static,
{
  type Key = A::Key;
  type Value = A::Value;

  fn get(&self, key: Self::Key) -> Future<Self::Value> {
    match (self.router)(&key) {
      SwitchDestination::Primary => self.primary.get(key),
      SwitchDestination::Secondary => self.secondary.get(key),
    }
  }

  fn set(&self, value: Self::Value, key: Self::Key) -> Future<()> {
    match (self.router)(&key) {
      SwitchDestination::Primary => self.primary.set(value, key),
      SwitchDestination::Secondary => self.secondary.set(value, key),
    }
  }

  fn clear(&self) {
    self.primary.clear();
    self.secondary.clear();
  }

  fn on_memory_warning(&self) {
    self.primary.on_memory_warning();
    self.secondary.on_memory_warning();
  }
}
