use crate::error::Error;

/// The terminal, three-way result of an asynchronous computation.
///
/// Exactly one variant holds once the computation settles, and a settled
/// outcome never changes. Cancellation is deliberately not an error: it is
/// its own variant, carried through combinators on a separate path so that
/// recovery logic never fires for it.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
  /// The computation produced a value.
  Success(T),
  /// The computation failed with an error.
  Failure(Error),
  /// The computation was cancelled before it could produce anything.
  Cancelled,
}

impl<T> Outcome<T> {
  pub fn is_success(&self) -> bool {
    matches!(self, Outcome::Success(_))
  }

  pub fn is_failure(&self) -> bool {
    matches!(self, Outcome::Failure(_))
  }

  pub fn is_cancelled(&self) -> bool {
    matches!(self, Outcome::Cancelled)
  }

  /// Returns the success value, if any.
  pub fn value(&self) -> Option<&T> {
    match self {
      Outcome::Success(value) => Some(value),
      _ => None,
    }
  }

  /// Returns the failure payload, if any.
  pub fn error(&self) -> Option<&Error> {
    match self {
      Outcome::Failure(error) => Some(error),
      _ => None,
    }
  }

  /// Consumes the outcome, returning the success value, if any.
  pub fn into_value(self) -> Option<T> {
    match self {
      Outcome::Success(value) => Some(value),
      _ => None,
    }
  }

  /// Transforms the success value, leaving failure and cancellation intact.
  pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
    match self {
      Outcome::Success(value) => Outcome::Success(f(value)),
      Outcome::Failure(error) => Outcome::Failure(error),
      Outcome::Cancelled => Outcome::Cancelled,
    }
  }
}

impl<T> From<Result<T, Error>> for Outcome<T> {
  fn from(result: Result<T, Error>) -> Self {
    match result {
      Ok(value) => Outcome::Success(value),
      Err(error) => Outcome::Failure(error),
    }
  }
}
