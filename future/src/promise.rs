use crate::core::FutureCore;
use crate::error::Error;
use crate::future::Future;
use crate::outcome::Outcome;

use std::sync::Arc;

/// The write side of a single-resolution computation.
///
/// Exactly the first of `succeed`/`fail`/`cancel` to execute — whether called
/// directly or driven by a mimicked source — determines the terminal outcome
/// of the associated [`Future`]; every later attempt is a silent no-op.
///
/// A `Promise` is a cheap handle and can be cloned; all clones write to the
/// same future.
///
/// # Examples
///
/// ```
/// use strata::Promise;
///
/// let promise = Promise::<u32>::new();
/// let future = promise.future();
///
/// promise.succeed(1);
/// promise.succeed(2); // no-op: the first settlement won
///
/// assert_eq!(future.wait().into_value(), Some(1));
/// ```
pub struct Promise<T> {
  pub(crate) core: Arc<FutureCore<T>>,
}

impl<T> Clone for Promise<T> {
  fn clone(&self) -> Self {
    Promise {
      core: Arc::clone(&self.core),
    }
  }
}

impl<T: Send + Sync + 'static> Promise<T> {
  /// Creates a new, pending promise.
  pub fn new() -> Self {
    Promise {
      core: Arc::new(FutureCore::new()),
    }
  }

  /// Returns the read handle for this promise. May be called any number of
  /// times; every handle observes the same single resolution.
  pub fn future(&self) -> Future<T> {
    Future {
      core: Arc::clone(&self.core),
    }
  }

  /// Settles the future with a success value, if nothing settled it first.
  pub fn succeed(&self, value: T) {
    self.core.settle(Outcome::Success(value));
  }

  /// Settles the future with a failure, if nothing settled it first.
  pub fn fail(&self, error: Error) {
    self.core.settle(Outcome::Failure(error));
  }

  /// Cancels the future, if nothing settled it first. Cancel listeners run,
  /// failure listeners do not, and every registered upstream cancellation
  /// hook fires.
  pub fn cancel(&self) {
    self.core.settle(Outcome::Cancelled);
  }

  /// Whether the associated future has settled.
  pub fn is_settled(&self) -> bool {
    self.core.is_settled()
  }

  /// Wires `upstream` so that cancelling this promise's future also cancels
  /// `upstream`, unless it already settled. Cancellation propagates strictly
  /// upstream; the hook never fires on success or failure.
  pub fn propagate_cancellation_to<U: Send + Sync + 'static>(&self, upstream: &Future<U>) {
    let upstream = upstream.clone();
    self.core.add_cancel_hook(Box::new(move || upstream.cancel()));
  }
}

impl<T: Clone + Send + Sync + 'static> Promise<T> {
  /// Mimics `source`: whichever of this promise's own writes or the source's
  /// settlement happens first wins, and the rest are ignored. Cancelling this
  /// promise's future also cancels the source if it has not settled.
  ///
  /// Any number of sources may be mimicked concurrently; the first-wins gate
  /// needs no extra coordination.
  pub fn mimic(&self, source: &Future<T>) -> &Self {
    self.propagate_cancellation_to(source);

    let target = self.clone();
    source.on_completion(move |outcome| target.settle_cloned(outcome));

    self
  }

  /// Mimics an already-determined outcome.
  pub fn mimic_outcome(&self, outcome: Outcome<T>) -> &Self {
    self.core.settle(outcome);
    self
  }

  pub(crate) fn settle_cloned(&self, outcome: &Outcome<T>) {
    match outcome {
      Outcome::Success(value) => self.succeed(value.clone()),
      Outcome::Failure(error) => self.fail(error.clone()),
      Outcome::Cancelled => self.cancel(),
    }
  }
}

impl<T: Send + Sync + 'static> Default for Promise<T> {
  fn default() -> Self {
    Promise::new()
  }
}
