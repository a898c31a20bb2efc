use crate::level::CacheLevel;

use strata::{Future, Outcome, Promise};
use tracing::warn;

use std::sync::Arc;

/// Two levels layered as fallback-with-write-back.
///
/// Reads try the fronting level first and fall back to the second only on
/// failure; a fallback hit is written back into the fronting level on a
/// best-effort basis. A cancellation from the fronting level is terminal
/// and never falls through.
pub struct ComposedCache<A, B> {
  first: Arc<A>,
  second: Arc<B>,
}

impl<A, B> ComposedCache<A, B>
where
  A: CacheLevel,
  B: CacheLevel<Key = A::Key, Value = A::Value>,
  A::Key: Clone,
{
  pub fn new(first: A, second: B) -> Self {
    ComposedCache {
      first: Arc::new(first),
      second: Arc::new(second),
    }
  }
}

impl<A, B> Clone for ComposedCache<A, B> {
  fn clone(&self) -> Self {
    ComposedCache {
      first: Arc::clone(&self.first),
      second: Arc::clone(&self.second),
    }
  }
}

impl<A, B> CacheLevel for ComposedCache<A, B>
where
  A: CacheLevel,
  B: CacheLevel<Key = A::Key, Value = A::Value>,
  A::Key: Clone,
{
  type Key = A::Key;
  type Value = A::Value;

  fn get(&self, key: Self::Key) -> Future<Self::Value> {
    let promise = Promise::new();
    let upstream = self.first.get(key.clone());
    promise.propagate_cancellation_to(&upstream);

    let target = promise.clone();
    let first = Arc::clone(&self.first);
    let second = Arc::clone(&self.second);
    upstream.on_completion(move |outcome| match outcome {
      Outcome::Success(value) => target.succeed(value.clone()),
      Outcome::Cancelled => target.cancel(),
      Outcome::Failure(_) => {
        let fallback = second.get(key.clone());
        target.propagate_cancellation_to(&fallback);

        let caller = target.clone();
        fallback.on_completion(move |outcome| match outcome {
          Outcome::Success(value) => {
            let value = value.clone();
            // Best-effort write-back; its outcome is not the caller's.
            first.set(value.clone(), key).on_failure(|error| {
              warn!("write-back to the fronting level failed: {}", error);
            });
            caller.succeed(value);
          }
          Outcome::Failure(error) => caller.fail(error.clone()),
          Outcome::Cancelled => caller.cancel(),
        });
      }
    });

    promise.future()
  }

  fn set(&self, value: Self::Value, key: Self::Key) -> Future<()> {
    let second = Arc::clone(&self.second);
    self
      .first
      .set(value.clone(), key.clone())
      .flat_map(move |_| second.set(value, key))
  }

  fn clear(&self) {
    self.first.clear();
    self.second.clear();
  }

  fn on_memory_warning(&self) {
    self.first.on_memory_warning();
    self.second.on_memory_warning();
  }
}
