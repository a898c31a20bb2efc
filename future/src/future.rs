use crate::core::{FutureCore, Listener};
use crate::error::Error;
use crate::outcome::Outcome;
use crate::promise::Promise;

use parking_lot::{Condvar, Mutex};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

/// The read side of a single-resolution computation.
///
/// A `Future` is a cheap cloneable handle shared between the producer and
/// every consumer. Callbacks may be registered any number of times, before
/// or after settlement; a late registration fires immediately and
/// synchronously with the stored outcome. Callback delivery always happens
/// on whatever thread performs the settling call — the primitive introduces
/// no threads of its own.
///
/// # Examples
///
/// ```
/// use strata::Future;
///
/// let future = Future::of(21).map(|n| n * 2);
/// assert_eq!(future.wait().into_value(), Some(42));
/// ```
pub struct Future<T> {
  pub(crate) core: Arc<FutureCore<T>>,
}

impl<T> Clone for Future<T> {
  fn clone(&self) -> Self {
    Future {
      core: Arc::clone(&self.core),
    }
  }
}

impl<T: Send + Sync + 'static> Future<T> {
  /// A future that already succeeded with `value`.
  pub fn of(value: T) -> Self {
    let promise = Promise::new();
    promise.succeed(value);
    promise.future()
  }

  /// A future that already failed with `error`.
  pub fn failed(error: Error) -> Self {
    let promise = Promise::new();
    promise.fail(error);
    promise.future()
  }

  /// A future that is already cancelled.
  pub fn cancelled() -> Self {
    let promise = Promise::new();
    promise.cancel();
    promise.future()
  }

  /// A future settled with a precomputed outcome.
  pub fn from_outcome(outcome: Outcome<T>) -> Self {
    let promise = Promise::new();
    promise.core.settle(outcome);
    promise.future()
  }

  /// Registers a callback for the success value. Returns the same future so
  /// registrations can be chained.
  pub fn on_success<F: FnOnce(&T) + Send + 'static>(&self, callback: F) -> &Self {
    self.core.register(Listener::Success(Box::new(callback)));
    self
  }

  /// Registers a callback for the failure payload.
  pub fn on_failure<F: FnOnce(&Error) + Send + 'static>(&self, callback: F) -> &Self {
    self.core.register(Listener::Failure(Box::new(callback)));
    self
  }

  /// Registers a callback for cancellation. Cancellation never triggers the
  /// failure callbacks.
  pub fn on_cancel<F: FnOnce() + Send + 'static>(&self, callback: F) -> &Self {
    self.core.register(Listener::Cancel(Box::new(callback)));
    self
  }

  /// Registers a callback fired on any settlement, with the full outcome.
  pub fn on_completion<F: FnOnce(&Outcome<T>) + Send + 'static>(&self, callback: F) -> &Self {
    self.core.register(Listener::Completion(Box::new(callback)));
    self
  }

  /// Requests cancellation. If the future has not yet settled this settles it
  /// as `Cancelled` and asks the upstream producer (through its registered
  /// cancellation hooks) to stop; on a settled future it is a no-op.
  pub fn cancel(&self) {
    self.core.settle(Outcome::Cancelled);
  }

  /// Whether a terminal outcome has been determined.
  pub fn is_settled(&self) -> bool {
    self.core.is_settled()
  }
}

impl<T: Clone + Send + Sync + 'static> Future<T> {
  /// Returns a clone of the outcome if the future has settled.
  pub fn try_outcome(&self) -> Option<Outcome<T>> {
    self.core.peek().cloned()
  }

  /// Blocks the calling thread until the future settles, returning the
  /// outcome. Intended for synchronous callers and tests; never call it from
  /// a thread that is itself responsible for settling this future.
  pub fn wait(&self) -> Outcome<T> {
    let gate = Arc::new((Mutex::new(None::<Outcome<T>>), Condvar::new()));
    let signal = Arc::clone(&gate);
    self.on_completion(move |outcome| {
      *signal.0.lock() = Some(outcome.clone());
      signal.1.notify_all();
    });

    let mut slot = gate.0.lock();
    while slot.is_none() {
      gate.1.wait(&mut slot);
    }
    match slot.take() {
      Some(outcome) => outcome,
      // Unreachable: the loop above only exits once the slot is filled.
      None => Outcome::Cancelled,
    }
  }

  /// Adapts this future for `async` callers. The returned adapter implements
  /// `std::future::Future` with the settled [`Outcome`] as its output.
  pub fn awaited(&self) -> Awaited<T> {
    let state = Arc::new(Mutex::new(AwaitState {
      outcome: None,
      waker: None,
    }));

    let shared = Arc::clone(&state);
    self.on_completion(move |outcome| {
      let waker = {
        let mut guard = shared.lock();
        guard.outcome = Some(outcome.clone());
        guard.waker.take()
      };
      if let Some(waker) = waker {
        waker.wake();
      }
    });

    Awaited { state }
  }
}

struct AwaitState<T> {
  outcome: Option<Outcome<T>>,
  waker: Option<Waker>,
}

/// Bridges a [`Future`] into `std::future::Future`.
#[must_use = "futures do nothing unless you .await or poll them"]
pub struct Awaited<T> {
  state: Arc<Mutex<AwaitState<T>>>,
}

impl<T: Clone + Send + Sync + 'static> std::future::Future for Awaited<T> {
  type Output = Outcome<T>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let mut guard = self.state.lock();
    match guard.outcome.take() {
      Some(outcome) => Poll::Ready(outcome),
      None => {
        guard.waker = Some(cx.waker().clone());
        Poll::Pending
      }
    }
  }
}
