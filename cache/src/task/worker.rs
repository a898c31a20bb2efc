use parking_lot::{Condvar, Mutex};

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send>;

struct WorkerQueue {
  jobs: VecDeque<Job>,
  stopping: bool,
}

struct WorkerShared {
  queue: Mutex<WorkerQueue>,
  signal: Condvar,
}

/// A dedicated thread that runs submitted jobs strictly in submission
/// order.
///
/// The disk level funnels every read, write, and eviction through one of
/// these, which both keeps blocking I/O off the calling context and
/// serializes index updates without further locking discipline at the call
/// sites. Dropping the worker drains the jobs already queued, then joins.
pub(crate) struct SerialWorker {
  shared: Arc<WorkerShared>,
  handle: Option<JoinHandle<()>>,
}

impl SerialWorker {
  pub(crate) fn spawn(name: &str) -> io::Result<Self> {
    let shared = Arc::new(WorkerShared {
      queue: Mutex::new(WorkerQueue {
        jobs: VecDeque::new(),
        stopping: false,
      }),
      signal: Condvar::new(),
    });

    let runner = Arc::clone(&shared);
    let handle = thread::Builder::new()
      .name(name.to_string())
      .spawn(move || runner.run())?;

    Ok(SerialWorker {
      shared,
      handle: Some(handle),
    })
  }

  pub(crate) fn execute<F: FnOnce() + Send + 'static>(&self, job: F) {
    let mut queue = self.shared.queue.lock();
    if queue.stopping {
      return;
    }
    queue.jobs.push_back(Box::new(job));
    self.shared.signal.notify_one();
  }
}

impl WorkerShared {
  fn run(&self) {
    loop {
      let job = {
        let mut queue = self.queue.lock();
        loop {
          if let Some(job) = queue.jobs.pop_front() {
            break Some(job);
          }
          if queue.stopping {
            break None;
          }
          self.signal.wait(&mut queue);
        }
      };

      match job {
        Some(job) => job(),
        None => return,
      }
    }
  }
}

impl Drop for SerialWorker {
  fn drop(&mut self) {
    {
      let mut queue = self.shared.queue.lock();
      queue.stopping = true;
      self.shared.signal.notify_one();
    }
    if let Some(handle) = self.handle.take() {
      let _ = handle.join();
    }
  }
}
