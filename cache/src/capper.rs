use crate::error::BuildError;
use crate::level::CacheLevel;

use parking_lot::Mutex;
use strata::{Future, Promise};

use std::collections::VecDeque;
use std::sync::Arc;

struct CapperState<K, V> {
  in_flight: usize,
  queued: VecDeque<(K, Promise<V>)>,
}

/// Bounds the number of simultaneously outstanding reads against the
/// wrapped level.
///
/// Reads beyond the cap wait in FIFO order and are dispatched as earlier
/// ones settle. A queued request whose future is cancelled before dispatch
/// never reaches the wrapped level; it is skipped when its turn comes.
/// Writes, `clear`, and `on_memory_warning` bypass the cap entirely.
pub struct RequestCapperCache<C: CacheLevel> {
  inner: Arc<C>,
  cap: usize,
  state: Arc<Mutex<CapperState<C::Key, C::Value>>>,
}

impl<C: CacheLevel> RequestCapperCache<C> {
  pub fn new(inner: C, cap: usize) -> Result<Self, BuildError> {
    if cap == 0 {
      return Err(BuildError::ZeroCapacity);
    }
    Ok(RequestCapperCache {
      inner: Arc::new(inner),
      cap,
      state: Arc::new(Mutex::new(CapperState {
        in_flight: 0,
        queued: VecDeque::new(),
      })),
    })
  }

  fn dispatch(
    inner: &Arc<C>,
    state: &Arc<Mutex<CapperState<C::Key, C::Value>>>,
    key: C::Key,
    promise: Promise<C::Value>,
  ) {
    let upstream = inner.get(key);
    promise.mimic(&upstream);

    let inner = Arc::clone(inner);
    let state = Arc::clone(state);
    upstream.on_completion(move |_| {
      let next = {
        let mut guard = state.lock();
        guard.in_flight -= 1;
        loop {
          match guard.queued.pop_front() {
            // Cancelled while queued; never forward it.
            Some((_, waiter)) if waiter.is_settled() => continue,
            Some(entry) => {
              guard.in_flight += 1;
              break Some(entry);
            }
            None => break None,
          }
        }
      };
      if let Some((key, waiter)) = next {
        Self::dispatch(&inner, &state, key, waiter);
      }
    });
  }
}

impl<C> Clone for RequestCapperCache<C>
where
  C: CacheLevel,
{
  fn clone(&self) -> Self {
    RequestCapperCache {
      inner: Arc::clone(&self.inner),
      cap: self.cap,
      state: Arc::clone(&self.state),
    }
  }
}

impl<C: CacheLevel> CacheLevel for RequestCapperCache<C> {
  type Key = C::Key;
  type Value = C::Value;

  fn get(&self, key: Self::Key) -> Future<Self::Value> {
    let promise = Promise::new();
    let future = promise.future();

    let immediate = {
      let mut guard = self.state.lock();
      if guard.in_flight < self.cap {
        guard.in_flight += 1;
        Some((key, promise))
      } else {
        guard.queued.push_back((key, promise));
        None
      }
    };

    if let Some((key, promise)) = immediate {
      Self::dispatch(&self.inner, &self.state, key, promise);
    }

    future
  }

  fn set(&self, value: Self::Value, key: Self::Key) -> Future<()> {
    self.inner.set(value, key)
  }

  fn clear(&self) {
    self.inner.clear();
  }

  fn on_memory_warning(&self) {
    self.inner.on_memory_warning();
  }
}
