use crate::level::CacheLevel;

use strata::{Error, Future, Outcome, Promise};

use std::marker::PhantomData;
use std::sync::Arc;

/// An invertible, fallible conversion between a stored representation and
/// the one exposed to callers.
pub trait TwoWayTransformer: Send + Sync + 'static {
  type Source;
  type Target;

  fn forward(&self, value: Self::Source) -> Result<Self::Target, Error>;
  fn backward(&self, value: Self::Target) -> Result<Self::Source, Error>;
}

/// A [`TwoWayTransformer`] built from a pair of closures.
pub struct BasicTransformer<S, T> {
  forward_fn: Arc<dyn Fn(S) -> Result<T, Error> + Send + Sync>,
  backward_fn: Arc<dyn Fn(T) -> Result<S, Error> + Send + Sync>,
}

impl<S, T> BasicTransformer<S, T> {
  pub fn new<F, B>(forward: F, backward: B) -> Self
  where
    F: Fn(S) -> Result<T, Error> + Send + Sync + 'static,
    B: Fn(T) -> Result<S, Error> + Send + Sync + 'static,
  {
    BasicTransformer {
      forward_fn: Arc::new(forward),
      backward_fn: Arc::new(backward),
    }
  }
}

impl<S: 'static, T: 'static> TwoWayTransformer for BasicTransformer<S, T> {
  type Source = S;
  type Target = T;

  fn forward(&self, value: S) -> Result<T, Error> {
    (self.forward_fn)(value)
  }

  fn backward(&self, value: T) -> Result<S, Error> {
    (self.backward_fn)(value)
  }
}

/// Exposes a wrapped level under a caller-facing key type.
///
/// The transform runs before anything reaches the level; its failure is
/// the call's failure, and the level never sees the rejected key.
pub struct KeyTransformCache<C, F, K> {
  inner: C,
  transform: F,
  _marker: PhantomData<fn(K)>,
}

impl<C, F, K> KeyTransformCache<C, F, K>
where
  C: CacheLevel,
  K: Send + 'static,
  F: Fn(K) -> Result<C::Key, Error> + Send + Sync + 'static,
{
  pub fn new(inner: C, transform: F) -> Self {
    KeyTransformCache {
      inner,
      transform,
      _marker: PhantomData,
    }
  }
}

impl<C, F, K> CacheLevel for KeyTransformCache<C, F, K>
where
  C: CacheLevel,
  K: Send + 'static,
  F: Fn(K) -> Result<C::Key, Error> + Send + Sync + 'static,
{
  type Key = K;
  type Value = C::Value;

  fn get(&self, key: K) -> Future<Self::Value> {
    match (self.transform)(key) {
      Ok(inner_key) => self.inner.get(inner_key),
      Err(error) => Future::failed(error),
    }
  }

  fn set(&self, value: Self::Value, key: K) -> Future<()> {
    match (self.transform)(key) {
      Ok(inner_key) => self.inner.set(value, inner_key),
      Err(error) => Future::failed(error),
    }
  }

  fn clear(&self) {
    self.inner.clear();
  }

  fn on_memory_warning(&self) {
    self.inner.on_memory_warning();
  }
}

/// Exposes a wrapped level under a caller-facing value type through a
/// [`TwoWayTransformer`]: reads map forward, writes map backward, and a
/// transform failure fails the call without touching the level.
pub struct ValueTransformCache<C, T> {
  inner: Arc<C>,
  transformer: Arc<T>,
}

impl<C, T> ValueTransformCache<C, T>
where
  C: CacheLevel,
  T: TwoWayTransformer<Source = C::Value>,
  T::Target: Clone + Send + Sync + 'static,
{
  pub fn new(inner: C, transformer: T) -> Self {
    ValueTransformCache {
      inner: Arc::new(inner),
      transformer: Arc::new(transformer),
    }
  }
}

impl<C, T> CacheLevel for ValueTransformCache<C, T>
where
  C: CacheLevel,
  T: TwoWayTransformer<Source = C::Value>,
  T::Target: Clone + Send + Sync + 'static,
{
  type Key = C::Key;
  type Value = T::Target;

  fn get(&self, key: Self::Key) -> Future<Self::Value> {
    let upstream = self.inner.get(key);
    let promise = Promise::new();
    promise.propagate_cancellation_to(&upstream);

    let target = promise.clone();
    let transformer = Arc::clone(&self.transformer);
    upstream.on_completion(move |outcome| match outcome {
      Outcome::Success(value) => match transformer.forward(value.clone()) {
        Ok(mapped) => target.succeed(mapped),
        Err(error) => target.fail(error),
      },
      Outcome::Failure(error) => target.fail(error.clone()),
      Outcome::Cancelled => target.cancel(),
    });

    promise.future()
  }

  fn set(&self, value: Self::Value, key: Self::Key) -> Future<()> {
    match self.transformer.backward(value) {
      Ok(source) => self.inner.set(source, key),
      Err(error) => Future::failed(error),
    }
  }

  fn clear(&self) {
    self.inner.clear();
  }

  fn on_memory_warning(&self) {
    self.inner.on_memory_warning();
  }
}
