//! A minimal monotonic scheduler shared by the delay-based combinators.
//!
//! One thread, spawned lazily on first use, owns a min-heap of deadlines and
//! runs each job on expiry. Jobs are one-shot boxed closures; a job that is
//! no longer relevant (for example a timeout whose future settled first)
//! simply becomes a no-op through the promise's first-wins gate, so the
//! scheduler never needs cancellation support.

use crate::future::Future;
use crate::promise::Promise;

use once_cell::sync::Lazy;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

struct ScheduledJob {
  deadline: Instant,
  seq: u64,
  job: Box<dyn FnOnce() + Send>,
}

// Ordered so that the earliest deadline surfaces at the top of the max-heap;
// the sequence number keeps same-instant jobs in submission order.
impl PartialEq for ScheduledJob {
  fn eq(&self, other: &Self) -> bool {
    self.deadline == other.deadline && self.seq == other.seq
  }
}

impl Eq for ScheduledJob {}

impl PartialOrd for ScheduledJob {
  fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
    Some(self.cmp(other))
  }
}

impl Ord for ScheduledJob {
  fn cmp(&self, other: &Self) -> CmpOrdering {
    other
      .deadline
      .cmp(&self.deadline)
      .then_with(|| other.seq.cmp(&self.seq))
  }
}

struct Scheduler {
  queue: Mutex<BinaryHeap<ScheduledJob>>,
  signal: Condvar,
  next_seq: AtomicU64,
}

impl Scheduler {
  fn run(&self) {
    let mut queue = self.queue.lock();
    loop {
      let now = Instant::now();

      while queue.peek().map_or(false, |job| job.deadline <= now) {
        if let Some(due) = queue.pop() {
          // Run outside the lock: the job may schedule further delays.
          MutexGuard::unlocked(&mut queue, || (due.job)());
        }
      }

      match queue.peek().map(|job| job.deadline) {
        Some(deadline) => {
          self.signal.wait_until(&mut queue, deadline);
        }
        None => self.signal.wait(&mut queue),
      }
    }
  }
}

static SCHEDULER: Lazy<Arc<Scheduler>> = Lazy::new(|| {
  let scheduler = Arc::new(Scheduler {
    queue: Mutex::new(BinaryHeap::new()),
    signal: Condvar::new(),
    next_seq: AtomicU64::new(0),
  });

  let worker = Arc::clone(&scheduler);
  thread::Builder::new()
    .name("strata-timer".into())
    .spawn(move || worker.run())
    .expect("failed to spawn timer thread");

  scheduler
});

/// Runs `job` once `delay` has elapsed, on the scheduler thread.
pub(crate) fn schedule<F: FnOnce() + Send + 'static>(delay: Duration, job: F) {
  let scheduler = &*SCHEDULER;
  let entry = ScheduledJob {
    deadline: Instant::now() + delay,
    seq: scheduler.next_seq.fetch_add(1, Ordering::Relaxed),
    job: Box::new(job),
  };
  scheduler.queue.lock().push(entry);
  scheduler.signal.notify_one();
}

/// Returns a future that succeeds with `()` after `duration`.
///
/// Cancelling the returned future before the deadline settles it as
/// cancelled; the eventual tick is then absorbed by the first-wins gate.
pub fn delay(duration: Duration) -> Future<()> {
  let promise = Promise::new();
  let target = promise.clone();
  schedule(duration, move || target.succeed(()));
  promise.future()
}
