//! Transformations of one or more futures into a new future.
//!
//! Every combinator follows the same three laws: failure or cancellation of
//! a required input propagates to the output unless intercepting it is the
//! combinator's documented purpose; cancelling the output cancels every
//! input that has not yet settled; and the output settles exactly once.

use crate::error::{wrap, Error, FutureError};
use crate::future::Future;
use crate::outcome::Outcome;
use crate::promise::Promise;
use crate::timer;

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

impl<T: Send + Sync + 'static> Future<T> {
  /// Transforms the success value; failure and cancellation pass through.
  pub fn map<U, F>(&self, f: F) -> Future<U>
  where
    U: Send + Sync + 'static,
    F: FnOnce(&T) -> U + Send + 'static,
  {
    let promise = Promise::new();
    promise.propagate_cancellation_to(self);

    let target = promise.clone();
    self.on_completion(move |outcome| match outcome {
      Outcome::Success(value) => target.succeed(f(value)),
      Outcome::Failure(error) => target.fail(error.clone()),
      Outcome::Cancelled => target.cancel(),
    });

    promise.future()
  }

  /// Chains a dependent asynchronous computation onto the success value.
  /// Cancelling the output cancels whichever stage is currently pending.
  pub fn flat_map<U, F>(&self, f: F) -> Future<U>
  where
    U: Clone + Send + Sync + 'static,
    F: FnOnce(&T) -> Future<U> + Send + 'static,
  {
    let promise = Promise::new();
    promise.propagate_cancellation_to(self);

    let target = promise.clone();
    self.on_completion(move |outcome| match outcome {
      Outcome::Success(value) => {
        let inner = f(value);
        target.mimic(&inner);
      }
      Outcome::Failure(error) => target.fail(error.clone()),
      Outcome::Cancelled => target.cancel(),
    });

    promise.future()
  }

  /// Like [`flat_map`](Future::flat_map) for closures that may produce no
  /// value; `None` fails the output with [`FutureError::MappingFailed`].
  pub fn flat_map_option<U, F>(&self, f: F) -> Future<U>
  where
    U: Send + Sync + 'static,
    F: FnOnce(&T) -> Option<U> + Send + 'static,
  {
    let promise = Promise::new();
    promise.propagate_cancellation_to(self);

    let target = promise.clone();
    self.on_completion(move |outcome| match outcome {
      Outcome::Success(value) => match f(value) {
        Some(mapped) => target.succeed(mapped),
        None => target.fail(wrap(FutureError::MappingFailed)),
      },
      Outcome::Failure(error) => target.fail(error.clone()),
      Outcome::Cancelled => target.cancel(),
    });

    promise.future()
  }

  /// Like [`flat_map`](Future::flat_map) for fallible synchronous closures;
  /// an `Err` fails the output with [`FutureError::MappingFailed`].
  pub fn flat_map_result<U, F>(&self, f: F) -> Future<U>
  where
    U: Send + Sync + 'static,
    F: FnOnce(&T) -> Result<U, Error> + Send + 'static,
  {
    self.flat_map_option(move |value| f(value).ok())
  }
}

impl<T: Clone + Send + Sync + 'static> Future<T> {
  /// Rejects success values that do not satisfy `predicate`, failing with
  /// [`FutureError::ConditionUnsatisfied`]. Failure and cancellation pass
  /// through untouched.
  pub fn filter<F>(&self, predicate: F) -> Future<T>
  where
    F: FnOnce(&T) -> bool + Send + 'static,
  {
    let promise = Promise::new();
    promise.propagate_cancellation_to(self);

    let target = promise.clone();
    self.on_completion(move |outcome| match outcome {
      Outcome::Success(value) => {
        if predicate(value) {
          target.succeed(value.clone());
        } else {
          target.fail(wrap(FutureError::ConditionUnsatisfied));
        }
      }
      Outcome::Failure(error) => target.fail(error.clone()),
      Outcome::Cancelled => target.cancel(),
    });

    promise.future()
  }

  /// [`filter`](Future::filter) with an asynchronous predicate. A predicate
  /// failure or cancellation propagates as-is; a `false` verdict fails with
  /// [`FutureError::ConditionUnsatisfied`].
  pub fn filter_with_future<F>(&self, predicate: F) -> Future<T>
  where
    F: FnOnce(&T) -> Future<bool> + Send + 'static,
  {
    let promise = Promise::new();
    promise.propagate_cancellation_to(self);

    let target = promise.clone();
    self.on_completion(move |outcome| match outcome {
      Outcome::Success(value) => {
        let value = value.clone();
        let verdict = predicate(&value);
        target.propagate_cancellation_to(&verdict);
        verdict.on_completion(move |decision| match decision {
          Outcome::Success(true) => target.succeed(value),
          Outcome::Success(false) => target.fail(wrap(FutureError::ConditionUnsatisfied)),
          Outcome::Failure(error) => target.fail(error.clone()),
          Outcome::Cancelled => target.cancel(),
        });
      }
      Outcome::Failure(error) => target.fail(error.clone()),
      Outcome::Cancelled => target.cancel(),
    });

    promise.future()
  }

  /// Replaces a failure with `fallback`. Success and cancellation are never
  /// intercepted.
  pub fn recover(&self, fallback: T) -> Future<T> {
    self.recover_with(move || fallback)
  }

  /// Replaces a failure with the result of `fallback`.
  pub fn recover_with<F>(&self, fallback: F) -> Future<T>
  where
    F: FnOnce() -> T + Send + 'static,
  {
    let promise = Promise::new();
    promise.propagate_cancellation_to(self);

    let target = promise.clone();
    self.on_completion(move |outcome| match outcome {
      Outcome::Success(value) => target.succeed(value.clone()),
      Outcome::Failure(_) => target.succeed(fallback()),
      Outcome::Cancelled => target.cancel(),
    });

    promise.future()
  }

  /// Replaces a failure with an asynchronous fallback; if the fallback
  /// itself fails or is cancelled, that becomes the final outcome.
  pub fn recover_with_future<F>(&self, fallback: F) -> Future<T>
  where
    F: FnOnce() -> Future<T> + Send + 'static,
  {
    let promise = Promise::new();
    promise.propagate_cancellation_to(self);

    let target = promise.clone();
    self.on_completion(move |outcome| match outcome {
      Outcome::Success(value) => target.succeed(value.clone()),
      Outcome::Failure(_) => {
        let recovery = fallback();
        target.mimic(&recovery);
      }
      Outcome::Cancelled => target.cancel(),
    });

    promise.future()
  }

  /// Pairs two futures, succeeding only when both succeed. The first failure
  /// or cancellation from either side determines the outcome.
  pub fn zip<U>(&self, other: &Future<U>) -> Future<(T, U)>
  where
    U: Clone + Send + Sync + 'static,
  {
    let promise = Promise::new();
    promise.propagate_cancellation_to(self);
    promise.propagate_cancellation_to(other);

    let slots: Arc<Mutex<(Option<T>, Option<U>)>> = Arc::new(Mutex::new((None, None)));

    let target = promise.clone();
    let left_slots = Arc::clone(&slots);
    self.on_completion(move |outcome| match outcome {
      Outcome::Success(value) => {
        let ready = {
          let mut guard = left_slots.lock();
          guard.0 = Some(value.clone());
          match (guard.0.take(), guard.1.take()) {
            (Some(left), Some(right)) => Some((left, right)),
            (left, right) => {
              guard.0 = left;
              guard.1 = right;
              None
            }
          }
        };
        if let Some(pair) = ready {
          target.succeed(pair);
        }
      }
      Outcome::Failure(error) => target.fail(error.clone()),
      Outcome::Cancelled => target.cancel(),
    });

    let target = promise.clone();
    let right_slots = Arc::clone(&slots);
    other.on_completion(move |outcome| match outcome {
      Outcome::Success(value) => {
        let ready = {
          let mut guard = right_slots.lock();
          guard.1 = Some(value.clone());
          match (guard.0.take(), guard.1.take()) {
            (Some(left), Some(right)) => Some((left, right)),
            (left, right) => {
              guard.0 = left;
              guard.1 = right;
              None
            }
          }
        };
        if let Some(pair) = ready {
          target.succeed(pair);
        }
      }
      Outcome::Failure(error) => target.fail(error.clone()),
      Outcome::Cancelled => target.cancel(),
    });

    promise.future()
  }

  /// [`zip`](Future::zip) against an already-determined outcome, for
  /// synchronous composition.
  pub fn zip_outcome<U>(&self, other: Outcome<U>) -> Future<(T, U)>
  where
    U: Clone + Send + Sync + 'static,
  {
    self.zip(&Future::from_outcome(other))
  }

  /// Defers delivery of this future's outcome by `delay` without re-running
  /// the computation.
  pub fn snooze(&self, delay: Duration) -> Future<T> {
    let promise = Promise::new();
    promise.propagate_cancellation_to(self);

    let target = promise.clone();
    self.on_completion(move |outcome| {
      let outcome = outcome.clone();
      timer::schedule(delay, move || {
        target.mimic_outcome(outcome);
      });
    });

    promise.future()
  }

  /// Fails with [`FutureError::Timeout`] unless this future settles within
  /// `after`. If the deadline fires, the output detaches from the (possibly
  /// still pending) input; if the input settles first, its outcome passes
  /// through immediately.
  pub fn timeout(&self, after: Duration) -> Future<T> {
    let promise = Promise::new();
    promise.mimic(self);

    let target = promise.clone();
    timer::schedule(after, move || {
      target.fail(wrap(FutureError::Timeout));
    });

    promise.future()
  }
}

/// Invokes `f` and retries up to `times` additional attempts after each
/// failure, waiting `every` between attempts. Success and cancellation are
/// never retried; `times` of zero behaves as a single attempt. Cancelling
/// the returned future cancels the attempt currently in flight.
pub fn retry<T, F>(times: usize, every: Duration, f: F) -> Future<T>
where
  T: Clone + Send + Sync + 'static,
  F: Fn() -> Future<T> + Send + Sync + 'static,
{
  let result = Promise::new();
  run_attempt(times, every, Arc::new(f), result.clone());
  result.future()
}

fn run_attempt<T>(
  remaining: usize,
  every: Duration,
  f: Arc<dyn Fn() -> Future<T> + Send + Sync>,
  result: Promise<T>,
) where
  T: Clone + Send + Sync + 'static,
{
  let attempt = f();
  result.propagate_cancellation_to(&attempt);

  attempt.on_completion(move |outcome| match outcome {
    Outcome::Success(value) => result.succeed(value.clone()),
    Outcome::Cancelled => result.cancel(),
    Outcome::Failure(error) => {
      if remaining == 0 {
        result.fail(error.clone());
      } else {
        timer::schedule(every, move || {
          // A cancellation during the wait must not spawn a fresh attempt.
          if result.is_settled() {
            return;
          }
          run_attempt(remaining - 1, every, f, result);
        });
      }
    }
  });
}
