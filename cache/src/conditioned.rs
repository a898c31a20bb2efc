use crate::error::CacheError;
use crate::level::CacheLevel;

use strata::{wrap, Future, Outcome, Promise};

use std::sync::Arc;

/// Gates `get` and `set` behind an asynchronous predicate on the key.
///
/// A `false` verdict short-circuits with [`CacheError::ConditionNotSatisfied`];
/// a predicate failure short-circuits with its own error. Either way the
/// wrapped level is never touched. `clear` and `on_memory_warning` are not
/// gated.
pub struct ConditionedCache<C, F> {
  inner: Arc<C>,
  condition: F,
}

impl<C, F> ConditionedCache<C, F>
where
  C: CacheLevel,
  F: Fn(&C::Key) -> Future<bool> + Send + Sync + 'static,
{
  pub fn new(inner: C, condition: F) -> Self {
    ConditionedCache {
      inner: Arc::new(inner),
      condition,
    }
  }
}

impl<C, F> CacheLevel for ConditionedCache<C, F>
where
  C: CacheLevel,
  F: Fn(&C::Key) -> Future<bool> + Send + Sync + 'static,
{
  type Key = C::Key;
  type Value = C::Value;

  fn get(&self, key: Self::Key) -> Future<Self::Value> {
    let verdict = (self.condition)(&key);
    let promise = Promise::new();
    promise.propagate_cancellation_to(&verdict);

    let inner = Arc::clone(&self.inner);
    let target = promise.clone();
    verdict.on_completion(move |outcome| match outcome {
      Outcome::Success(true) => {
        target.mimic(&inner.get(key));
      }
      Outcome::Success(false) => target.fail(wrap(CacheError::ConditionNotSatisfied)),
      Outcome::Failure(error) => target.fail(error.clone()),
      Outcome::Cancelled => target.cancel(),
    });

    promise.future()
  }

  fn set(&self, value: Self::Value, key: Self::Key) -> Future<()> {
    let verdict = (self.condition)(&key);
    let promise = Promise::new();
    promise.propagate_cancellation_to(&verdict);

    let inner = Arc::clone(&self.inner);
    let target = promise.clone();
    verdict.on_completion(move |outcome| match outcome {
      Outcome::Success(true) => {
        target.mimic(&inner.set(value, key));
      }
      Outcome::Success(false) => target.fail(wrap(CacheError::ConditionNotSatisfied)),
      Outcome::Failure(error) => target.fail(error.clone()),
      Outcome::Cancelled => target.cancel(),
    });

    promise.future()
  }

  fn clear(&self) {
    self.inner.clear();
  }

  fn on_memory_warning(&self) {
    self.inner.on_memory_warning();
  }
}
