use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// The error payload carried by a failed [`Outcome`](crate::Outcome).
///
/// Failures are delivered to an unbounded number of listeners, so the payload
/// is reference-counted rather than boxed. Any `std::error::Error` can be
/// wrapped with [`wrap`], and listeners can recover the concrete type through
/// `downcast_ref`.
pub type Error = Arc<dyn StdError + Send + Sync + 'static>;

/// Wraps a concrete error into the shared [`Error`] payload.
pub fn wrap<E: StdError + Send + Sync + 'static>(error: E) -> Error {
  Arc::new(error)
}

/// Errors injected by combinators themselves, as opposed to errors produced
/// by the underlying computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FutureError {
  /// A `flat_map` closure returned `None` or an `Err`, so there is no value
  /// to continue the chain with.
  MappingFailed,
  /// A `filter` predicate rejected the success value.
  ConditionUnsatisfied,
  /// The future did not settle within the duration given to `timeout`.
  Timeout,
}

impl fmt::Display for FutureError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FutureError::MappingFailed => write!(f, "mapping closure produced no value"),
      FutureError::ConditionUnsatisfied => write!(f, "filter condition was not satisfied"),
      FutureError::Timeout => write!(f, "future timed out"),
    }
  }
}

impl StdError for FutureError {}

/// Returns true if `error` is the given combinator-injected error.
///
/// Convenience for tests and recovery code that needs to distinguish a
/// combinator error from a source error.
pub fn is_future_error(error: &Error, kind: FutureError) -> bool {
  error.downcast_ref::<FutureError>() == Some(&kind)
}
