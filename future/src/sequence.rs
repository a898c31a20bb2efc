//! Aggregation operators over collections of futures.
//!
//! Result ordering for [`merge_all`]/[`merge_some`]/[`traverse`] always
//! follows the position of each element in the input collection, never the
//! order in which the underlying futures happen to settle.
//! [`first_completed`] is the one settlement-ordered operator.

use crate::future::Future;
use crate::outcome::Outcome;
use crate::promise::Promise;

use parking_lot::Mutex;
use std::sync::Arc;

struct MergeState<T> {
  slots: Vec<Option<T>>,
  remaining: usize,
}

fn cancel_pending<T: Send + Sync + 'static>(futures: &[Future<T>]) {
  for future in futures {
    // No-op on anything that already settled.
    future.cancel();
  }
}

/// Succeeds with `()` once every input succeeds. The first failure or
/// cancellation short-circuits the output and cancels the remaining pending
/// inputs. Cancelling the output cancels every pending input.
pub fn all<T>(futures: Vec<Future<T>>) -> Future<()>
where
  T: Send + Sync + 'static,
{
  if futures.is_empty() {
    return Future::of(());
  }

  let promise = Promise::new();
  for future in &futures {
    promise.propagate_cancellation_to(future);
  }

  let futures = Arc::new(futures);
  let remaining = Arc::new(Mutex::new(futures.len()));

  for future in futures.iter() {
    let target = promise.clone();
    let remaining = Arc::clone(&remaining);
    let peers = Arc::clone(&futures);
    future.on_completion(move |outcome| match outcome {
      Outcome::Success(_) => {
        let done = {
          let mut left = remaining.lock();
          *left -= 1;
          *left == 0
        };
        if done {
          target.succeed(());
        }
      }
      Outcome::Failure(error) => {
        target.fail(error.clone());
        cancel_pending(&peers);
      }
      Outcome::Cancelled => target.cancel(),
    });
  }

  promise.future()
}

/// Succeeds with every input's success value, in input order, once all
/// inputs succeed. Failure and cancellation behave exactly as in [`all`].
pub fn merge_all<T>(futures: Vec<Future<T>>) -> Future<Vec<T>>
where
  T: Clone + Send + Sync + 'static,
{
  if futures.is_empty() {
    return Future::of(Vec::new());
  }

  let promise = Promise::new();
  for future in &futures {
    promise.propagate_cancellation_to(future);
  }

  let futures = Arc::new(futures);
  let state = Arc::new(Mutex::new(MergeState {
    slots: vec![None; futures.len()],
    remaining: futures.len(),
  }));

  for (index, future) in futures.iter().enumerate() {
    let target = promise.clone();
    let state = Arc::clone(&state);
    let peers = Arc::clone(&futures);
    future.on_completion(move |outcome| match outcome {
      Outcome::Success(value) => {
        let collected = {
          let mut guard = state.lock();
          guard.slots[index] = Some(value.clone());
          guard.remaining -= 1;
          if guard.remaining == 0 {
            guard.slots.iter_mut().map(Option::take).collect::<Option<Vec<T>>>()
          } else {
            None
          }
        };
        if let Some(values) = collected {
          target.succeed(values);
        }
      }
      Outcome::Failure(error) => {
        target.fail(error.clone());
        cancel_pending(&peers);
      }
      Outcome::Cancelled => target.cancel(),
    });
  }

  promise.future()
}

/// Collects the successful values in input order, ignoring individual
/// failures. Cancellation — of the aggregate or of any contributing element
/// — still cancels through.
pub fn merge_some<T>(futures: Vec<Future<T>>) -> Future<Vec<T>>
where
  T: Clone + Send + Sync + 'static,
{
  if futures.is_empty() {
    return Future::of(Vec::new());
  }

  let promise = Promise::new();
  for future in &futures {
    promise.propagate_cancellation_to(future);
  }

  let state = Arc::new(Mutex::new(MergeState {
    slots: vec![None; futures.len()],
    remaining: futures.len(),
  }));

  for (index, future) in futures.iter().enumerate() {
    let target = promise.clone();
    let state = Arc::clone(&state);
    future.on_completion(move |outcome| match outcome {
      Outcome::Cancelled => target.cancel(),
      settled => {
        let collected = {
          let mut guard = state.lock();
          if let Outcome::Success(value) = settled {
            guard.slots[index] = Some(value.clone());
          }
          guard.remaining -= 1;
          if guard.remaining == 0 {
            Some(guard.slots.iter_mut().filter_map(Option::take).collect::<Vec<T>>())
          } else {
            None
          }
        };
        if let Some(values) = collected {
          target.succeed(values);
        }
      }
    });
  }

  promise.future()
}

/// Settles with whichever input settles first — success, failure, or
/// cancellation — and cancels the rest.
pub fn first_completed<T>(futures: Vec<Future<T>>) -> Future<T>
where
  T: Clone + Send + Sync + 'static,
{
  let promise = Promise::new();

  let futures = Arc::new(futures);
  for future in futures.iter() {
    promise.mimic(future);
  }

  let peers = Arc::clone(&futures);
  promise.future().on_completion(move |_| {
    cancel_pending(&peers);
  });

  promise.future()
}

/// Maps every element through `f` and merges the resulting futures with
/// [`merge_all`] semantics: all-or-nothing, results in input order.
pub fn traverse<I, T, F>(items: I, f: F) -> Future<Vec<T>>
where
  I: IntoIterator,
  T: Clone + Send + Sync + 'static,
  F: FnMut(I::Item) -> Future<T>,
{
  merge_all(items.into_iter().map(f).collect())
}
