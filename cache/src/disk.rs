use crate::error::{BuildError, CacheError};
use crate::level::CacheLevel;
use crate::lru::LruIndex;
use crate::task::SerialWorker;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use strata::{wrap, Future, Promise};
use tracing::{debug, warn};

use std::fmt::Display;
use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

struct DiskShared {
  dir: PathBuf,
  capacity: u64,
  index: Mutex<LruIndex<String>>,
}

/// A capacity-bounded store persisting one file per entry.
///
/// Filenames are a stable digest of the key's display form, so entries
/// written by one process are found by the next. The size/recency index is
/// rebuilt from directory metadata on startup (file size plus mtime), which
/// is how eviction decisions survive restarts: writes refresh mtime, reads
/// refresh recency in the running index only.
///
/// Every read, write, and eviction runs on a dedicated worker thread, off
/// the calling context, with the outcome delivered through the returned
/// future. The single thread also serializes index updates, so concurrent
/// `set` calls for different keys cannot corrupt the capacity accounting.
pub struct DiskCacheLevel<K, V> {
  shared: Arc<DiskShared>,
  worker: SerialWorker,
  _marker: PhantomData<fn(K) -> V>,
}

fn file_name_for<K: Display>(key: &K) -> String {
  format!("{:016x}", rapidhash::rapidhash(key.to_string().as_bytes()))
}

fn build_io(error: std::io::Error) -> BuildError {
  BuildError::Io(error.to_string())
}

impl<K, V> DiskCacheLevel<K, V> {
  pub fn new(dir: impl Into<PathBuf>, capacity: u64) -> Result<Self, BuildError> {
    if capacity == 0 {
      return Err(BuildError::ZeroCapacity);
    }

    let dir = dir.into();
    fs::create_dir_all(&dir).map_err(build_io)?;

    let mut found = Vec::new();
    for entry in fs::read_dir(&dir).map_err(build_io)? {
      let entry = entry.map_err(build_io)?;
      let metadata = entry.metadata().map_err(build_io)?;
      if !metadata.is_file() {
        continue;
      }
      let name = entry.file_name().to_string_lossy().into_owned();
      let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
      found.push((name, metadata.len(), modified));
    }

    // Oldest first, so the rebuilt index ranks them least recent.
    found.sort_by_key(|(_, _, modified)| *modified);
    let mut index = LruIndex::new();
    for (name, size, _) in found {
      index.insert(name, size);
    }

    let stale = index.evict_over_capacity(capacity);
    for name in &stale {
      debug!("trimming persisted entry {} left over from an earlier run", name);
      let _ = fs::remove_file(dir.join(name));
    }

    let worker = SerialWorker::spawn("strata-disk").map_err(build_io)?;

    Ok(DiskCacheLevel {
      shared: Arc::new(DiskShared {
        dir,
        capacity,
        index: Mutex::new(index),
      }),
      worker,
      _marker: PhantomData,
    })
  }
}

impl<K, V> CacheLevel for DiskCacheLevel<K, V>
where
  K: Display + Send + 'static,
  V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
  type Key = K;
  type Value = V;

  fn get(&self, key: K) -> Future<V> {
    let promise = Promise::new();
    let target = promise.clone();
    let shared = Arc::clone(&self.shared);
    let name = file_name_for(&key);

    self.worker.execute(move || {
      let path = shared.dir.join(&name);
      match fs::read(&path) {
        Ok(bytes) => match bincode::deserialize::<V>(&bytes) {
          Ok(value) => {
            shared.index.lock().touch(&name);
            target.succeed(value);
          }
          Err(error) => {
            warn!("undecodable persisted entry {}: {}", name, error);
            target.fail(wrap(CacheError::Serialization(error.to_string())));
          }
        },
        Err(_) => target.fail(wrap(CacheError::ValueNotInCache)),
      }
    });

    promise.future()
  }

  fn set(&self, value: V, key: K) -> Future<()> {
    let promise = Promise::new();
    let target = promise.clone();
    let shared = Arc::clone(&self.shared);
    let name = file_name_for(&key);

    self.worker.execute(move || {
      let payload = match bincode::serialize(&value) {
        Ok(payload) => payload,
        Err(error) => {
          target.fail(wrap(CacheError::Serialization(error.to_string())));
          return;
        }
      };

      if let Err(error) = fs::write(shared.dir.join(&name), &payload) {
        target.fail(wrap(CacheError::Io(error.to_string())));
        return;
      }

      let evicted = {
        let mut index = shared.index.lock();
        index.insert(name, payload.len() as u64);
        index.evict_over_capacity(shared.capacity)
      };
      for victim in evicted {
        debug!("evicting persisted entry {}", victim);
        if let Err(error) = fs::remove_file(shared.dir.join(&victim)) {
          warn!("failed to delete evicted entry {}: {}", victim, error);
        }
      }

      target.succeed(());
    });

    promise.future()
  }

  fn clear(&self) {
    let shared = Arc::clone(&self.shared);
    self.worker.execute(move || {
      let names = shared.index.lock().clear();
      for name in names {
        let _ = fs::remove_file(shared.dir.join(&name));
      }
    });
  }

  fn on_memory_warning(&self) {
    // Disk pressure is not memory pressure.
  }
}
