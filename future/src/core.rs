use crate::error::Error;
use crate::outcome::Outcome;

use parking_lot::Mutex;
use std::mem;
use std::sync::OnceLock;

/// A registered callback, kept in one ordered list so that listeners fire in
/// registration order regardless of kind.
pub(crate) enum Listener<T> {
  Success(Box<dyn FnOnce(&T) + Send>),
  Failure(Box<dyn FnOnce(&Error) + Send>),
  Cancel(Box<dyn FnOnce() + Send>),
  Completion(Box<dyn FnOnce(&Outcome<T>) + Send>),
}

/// The shared state behind one `Promise`/`Future` pair.
///
/// There is exactly one allocation per logical future; `Promise` and
/// `Future` are both thin `Arc` handles over it, so no reference cycle can
/// form between the write and read sides.
///
/// The `OnceLock` write is the single commit point for the first-settlement
/// race: every `succeed`/`fail`/`cancel` attempt (direct or via a mimicked
/// source) first tries to publish its outcome there, and only the winner
/// drains the listener list. Listeners are appended under the mutex and
/// drained exactly once, outside the lock, so a callback may freely register
/// further callbacks or settle other promises.
pub(crate) struct FutureCore<T> {
  outcome: OnceLock<Outcome<T>>,
  listeners: Mutex<Vec<Listener<T>>>,
  // Capabilities to request cancellation of whatever produces this future.
  // Run only when cancellation wins the settlement race; dropped otherwise.
  cancel_hooks: Mutex<Vec<Box<dyn FnOnce() + Send>>>,
}

impl<T> FutureCore<T> {
  pub(crate) fn new() -> Self {
    FutureCore {
      outcome: OnceLock::new(),
      listeners: Mutex::new(Vec::new()),
      cancel_hooks: Mutex::new(Vec::new()),
    }
  }

  pub(crate) fn is_settled(&self) -> bool {
    self.outcome.get().is_some()
  }

  pub(crate) fn peek(&self) -> Option<&Outcome<T>> {
    self.outcome.get()
  }

  /// Attempts to settle with `outcome`. Returns true if this call won the
  /// first-settlement race; later attempts are no-ops and return false.
  pub(crate) fn settle(&self, outcome: Outcome<T>) -> bool {
    if self.outcome.set(outcome).is_err() {
      return false;
    }

    // We won; the publish above is the commit point. Only this thread
    // drains, so each listener runs at most once.
    let settled = match self.outcome.get() {
      Some(settled) => settled,
      // Unreachable: we just set it.
      None => return true,
    };

    let drained = mem::take(&mut *self.listeners.lock());
    for listener in drained {
      Self::fire(listener, settled);
    }

    let hooks = mem::take(&mut *self.cancel_hooks.lock());
    if settled.is_cancelled() {
      for hook in hooks {
        hook();
      }
    }
    // A success/failure settlement simply drops the hooks: the upstream
    // producer finished on its own.

    true
  }

  /// Registers a listener, firing it immediately (on the caller's thread) if
  /// the future already settled.
  pub(crate) fn register(&self, listener: Listener<T>) {
    if let Some(settled) = self.outcome.get() {
      Self::fire(listener, settled);
      return;
    }

    let mut guard = self.listeners.lock();
    // Re-check under the lock: a settler publishes first and drains under
    // this same lock, so seeing a settled outcome here means the drain
    // either already happened or will skip us — fire directly instead.
    if let Some(settled) = self.outcome.get() {
      drop(guard);
      Self::fire(listener, settled);
      return;
    }
    guard.push(listener);
  }

  /// Registers a capability to cancel the upstream producer. If this future
  /// is already cancelled the hook runs immediately; if it settled any other
  /// way the hook is dropped.
  pub(crate) fn add_cancel_hook(&self, hook: Box<dyn FnOnce() + Send>) {
    match self.outcome.get() {
      Some(Outcome::Cancelled) => {
        hook();
        return;
      }
      Some(_) => return,
      None => {}
    }

    let mut guard = self.cancel_hooks.lock();
    match self.outcome.get() {
      Some(Outcome::Cancelled) => {
        drop(guard);
        hook();
      }
      Some(_) => {}
      None => guard.push(hook),
    }
  }

  fn fire(listener: Listener<T>, outcome: &Outcome<T>) {
    match (listener, outcome) {
      (Listener::Success(callback), Outcome::Success(value)) => callback(value),
      (Listener::Failure(callback), Outcome::Failure(error)) => callback(error),
      (Listener::Cancel(callback), Outcome::Cancelled) => callback(),
      (Listener::Completion(callback), outcome) => callback(outcome),
      // Listener kind does not match the settled outcome; it never fires.
      _ => {}
    }
  }
}
