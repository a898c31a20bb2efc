#![allow(dead_code)]

use parking_lot::Mutex;
use strata::{wrap, Error, Future, Promise};
use strata_cache::CacheLevel;

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  Get(String),
  Set(String, String),
  Clear,
  MemoryWarning,
}

#[derive(Debug)]
pub struct UpstreamDown;

impl fmt::Display for UpstreamDown {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "upstream down")
  }
}

impl std::error::Error for UpstreamDown {}

pub fn test_error() -> Error {
  wrap(UpstreamDown)
}

/// A fake level that records every call and leaves each returned future
/// pending until the test settles it explicitly.
pub struct ScriptedCache {
  calls: Arc<Mutex<Vec<Call>>>,
  gets: Arc<Mutex<Vec<(String, Promise<String>)>>>,
  sets: Arc<Mutex<Vec<(String, String, Promise<()>)>>>,
}

impl ScriptedCache {
  pub fn new() -> Self {
    ScriptedCache {
      calls: Arc::new(Mutex::new(Vec::new())),
      gets: Arc::new(Mutex::new(Vec::new())),
      sets: Arc::new(Mutex::new(Vec::new())),
    }
  }

  pub fn recorded(&self) -> Vec<Call> {
    self.calls.lock().clone()
  }

  pub fn get_count(&self) -> usize {
    self.gets.lock().len()
  }

  pub fn set_count(&self) -> usize {
    self.sets.lock().len()
  }

  pub fn get_request(&self, index: usize) -> (String, Promise<String>) {
    let guard = self.gets.lock();
    let (key, promise) = &guard[index];
    (key.clone(), promise.clone())
  }

  pub fn set_request(&self, index: usize) -> Promise<()> {
    self.sets.lock()[index].2.clone()
  }

  pub fn succeed_get(&self, index: usize, value: &str) {
    self.get_request(index).1.succeed(value.to_string());
  }

  pub fn fail_get(&self, index: usize) {
    self.get_request(index).1.fail(test_error());
  }

  pub fn succeed_set(&self, index: usize) {
    self.set_request(index).succeed(());
  }
}

impl Clone for ScriptedCache {
  fn clone(&self) -> Self {
    ScriptedCache {
      calls: Arc::clone(&self.calls),
      gets: Arc::clone(&self.gets),
      sets: Arc::clone(&self.sets),
    }
  }
}

impl CacheLevel for ScriptedCache {
  type Key = String;
  type Value = String;

  fn get(&self, key: String) -> Future<String> {
    self.calls.lock().push(Call::Get(key.clone()));
    let promise = Promise::new();
    let future = promise.future();
    self.gets.lock().push((key, promise));
    future
  }

  fn set(&self, value: String, key: String) -> Future<()> {
    self.calls.lock().push(Call::Set(key.clone(), value.clone()));
    let promise = Promise::new();
    let future = promise.future();
    self.sets.lock().push((key, value, promise));
    future
  }

  fn clear(&self) {
    self.calls.lock().push(Call::Clear);
  }

  fn on_memory_warning(&self) {
    self.calls.lock().push(Call::MemoryWarning);
  }
}
