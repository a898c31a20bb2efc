use std::fmt;

/// Errors surfaced through the future channel by the cache levels
/// themselves, as opposed to whatever the wrapped sources produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
  /// The requested key has no entry in this level.
  ValueNotInCache,
  /// A key transformer rejected the key before it reached the level.
  InvalidKey,
  /// A conditioned level's predicate returned `false`.
  ConditionNotSatisfied,
  /// The disk level failed to read, write, or delete an entry file.
  Io(String),
  /// The disk level failed to encode or decode an entry payload.
  Serialization(String),
}

impl fmt::Display for CacheError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CacheError::ValueNotInCache => write!(f, "value not in cache"),
      CacheError::InvalidKey => write!(f, "key rejected by transformer"),
      CacheError::ConditionNotSatisfied => write!(f, "cache condition not satisfied"),
      CacheError::Io(detail) => write!(f, "cache i/o error: {}", detail),
      CacheError::Serialization(detail) => write!(f, "cache serialization error: {}", detail),
    }
  }
}

impl std::error::Error for CacheError {}

/// Errors that can occur when building a cache level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
  /// A bounded level was configured with a capacity (or request cap) of
  /// zero, which would make every operation fail or queue forever.
  ZeroCapacity,
  /// The disk level could not prepare its directory or worker thread.
  Io(String),
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::ZeroCapacity => write!(f, "capacity cannot be zero"),
      BuildError::Io(detail) => write!(f, "i/o error during setup: {}", detail),
    }
  }
}

impl std::error::Error for BuildError {}

/// `true` when `error` is the given [`CacheError`], downcast through the
/// shared error type.
pub fn is_cache_error(error: &strata::Error, kind: CacheError) -> bool {
  error
    .downcast_ref::<CacheError>()
    .map_or(false, |found| *found == kind)
}
