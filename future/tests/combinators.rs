use strata::{delay, is_future_error, retry, wrap, Error, Future, FutureError, Outcome, Promise};

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct FetchRefused;

impl fmt::Display for FetchRefused {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "fetch refused")
  }
}

impl std::error::Error for FetchRefused {}

fn refused() -> Error {
  wrap(FetchRefused)
}

#[test]
fn map_transforms_success() {
  let future = Future::of(20).map(|n| n * 2 + 2);
  assert_eq!(future.wait().into_value(), Some(42));
}

#[test]
fn map_passes_failure_through_untouched() {
  let future = Future::<i32>::failed(refused()).map(|n| n + 1);
  match future.wait() {
    Outcome::Failure(error) => assert!(error.downcast_ref::<FetchRefused>().is_some()),
    other => panic!("expected the original failure, got {:?}", other),
  }
}

#[test]
fn flat_map_chains_dependent_futures() {
  let second = Promise::<String>::new();
  let second_future = second.future();

  let chained = Future::of(7).flat_map(move |n| {
    assert_eq!(*n, 7);
    second_future
  });

  second.succeed("seven".to_string());
  assert_eq!(chained.wait().into_value().as_deref(), Some("seven"));
}

#[test]
fn flat_map_cancellation_reaches_inner_stage() {
  let inner = Promise::<i32>::new();
  let inner_future = inner.future();

  let chained = Future::of(1).flat_map(move |_| inner_future);
  chained.cancel();

  assert!(inner.future().wait().is_cancelled());
  assert!(chained.wait().is_cancelled());
}

#[test]
fn flat_map_option_none_is_a_mapping_failure() {
  let future = Future::of(3).flat_map_option(|_| None::<i32>);
  match future.wait() {
    Outcome::Failure(error) => assert!(is_future_error(&error, FutureError::MappingFailed)),
    other => panic!("expected mapping failure, got {:?}", other),
  }
}

#[test]
fn flat_map_result_err_is_a_mapping_failure() {
  let future = Future::of(3).flat_map_result(|_| Err::<i32, _>(refused()));
  match future.wait() {
    Outcome::Failure(error) => assert!(is_future_error(&error, FutureError::MappingFailed)),
    other => panic!("expected mapping failure, got {:?}", other),
  }
}

#[test]
fn filter_accepts_and_rejects() {
  assert_eq!(Future::of(20).filter(|n| *n > 0).wait().into_value(), Some(20));

  match Future::of(-20).filter(|n| *n > 0).wait() {
    Outcome::Failure(error) => {
      assert!(is_future_error(&error, FutureError::ConditionUnsatisfied))
    }
    other => panic!("expected condition failure, got {:?}", other),
  }
}

#[test]
fn filter_with_future_async_verdict() {
  let verdict = Promise::<bool>::new();
  let verdict_future = verdict.future();

  let filtered = Future::of(10).filter_with_future(move |_| verdict_future);
  verdict.succeed(true);
  assert_eq!(filtered.wait().into_value(), Some(10));

  let rejected = Future::of(10).filter_with_future(|_| Future::of(false));
  match rejected.wait() {
    Outcome::Failure(error) => {
      assert!(is_future_error(&error, FutureError::ConditionUnsatisfied))
    }
    other => panic!("expected condition failure, got {:?}", other),
  }
}

#[test]
fn filter_with_future_passes_a_predicate_failure_through_untouched() {
  let filtered = Future::of(10).filter_with_future(|_| Future::failed(refused()));
  match filtered.wait() {
    Outcome::Failure(error) => assert!(error.downcast_ref::<FetchRefused>().is_some()),
    other => panic!("expected the predicate's own failure, got {:?}", other),
  }
}

#[test]
fn filter_with_future_passes_a_predicate_cancellation_through() {
  let verdict = Promise::<bool>::new();
  let verdict_future = verdict.future();

  let filtered = Future::of(10).filter_with_future(move |_| verdict_future);
  verdict.cancel();

  assert!(filtered.wait().is_cancelled());
}

#[test]
fn recover_replaces_failures_only() {
  assert_eq!(
    Future::<i32>::failed(refused()).recover(9).wait().into_value(),
    Some(9)
  );
  assert_eq!(Future::of(1).recover(9).wait().into_value(), Some(1));

  // Cancellation is not a failure and must not be recovered.
  assert!(Future::<i32>::cancelled().recover(9).wait().is_cancelled());
}

#[test]
fn recover_with_future_adopts_fallback_outcome() {
  let recovered = Future::<i32>::failed(refused()).recover_with_future(|| Future::of(5));
  assert_eq!(recovered.wait().into_value(), Some(5));

  let doubly_failed =
    Future::<i32>::failed(refused()).recover_with_future(|| Future::failed(refused()));
  assert!(doubly_failed.wait().is_failure());
}

#[test]
fn zip_pairs_both_successes() {
  let left = Promise::<i32>::new();
  let right = Promise::<String>::new();

  let zipped = left.future().zip(&right.future());
  right.succeed("b".to_string());
  left.succeed(1);

  assert_eq!(zipped.wait().into_value(), Some((1, "b".to_string())));
}

#[test]
fn zip_fails_as_soon_as_either_side_fails() {
  let left = Promise::<i32>::new();
  let right = Promise::<i32>::new();

  let zipped = left.future().zip(&right.future());
  right.fail(refused());

  assert!(zipped.wait().is_failure());
  // The other side never settles; the pair is already determined.
  assert!(!left.future().is_settled());
}

#[test]
fn zip_outcome_composes_synchronously() {
  let zipped = Future::of(1).zip_outcome(Outcome::Success("now"));
  assert_eq!(zipped.wait().into_value(), Some((1, "now")));
}

#[test]
fn cancelling_zip_cancels_both_pending_inputs() {
  let left = Promise::<i32>::new();
  let right = Promise::<i32>::new();

  let zipped = left.future().zip(&right.future());
  zipped.cancel();

  assert!(left.future().wait().is_cancelled());
  assert!(right.future().wait().is_cancelled());
}

#[test]
fn delay_settles_after_the_duration() {
  let started = Instant::now();
  assert!(delay(Duration::from_millis(50)).wait().is_success());
  assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test]
fn snooze_defers_delivery_not_computation() {
  let started = Instant::now();
  let snoozed = Future::of(3).snooze(Duration::from_millis(50));
  assert_eq!(snoozed.wait().into_value(), Some(3));
  assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test]
fn timeout_fires_when_the_input_never_settles() {
  let promise = Promise::<i32>::new();
  let guarded = promise.future().timeout(Duration::from_millis(50));

  match guarded.wait() {
    Outcome::Failure(error) => assert!(is_future_error(&error, FutureError::Timeout)),
    other => panic!("expected timeout, got {:?}", other),
  }
}

#[test]
fn timeout_firing_detaches_without_cancelling_the_input() {
  let promise = Promise::<i32>::new();
  let guarded = promise.future().timeout(Duration::from_millis(40));

  match guarded.wait() {
    Outcome::Failure(error) => assert!(is_future_error(&error, FutureError::Timeout)),
    other => panic!("expected timeout, got {:?}", other),
  }

  // The input is merely detached; it may still settle on its own later.
  assert!(!promise.future().is_settled());
  promise.succeed(5);
  assert_eq!(promise.future().wait().into_value(), Some(5));
}

#[test]
fn timeout_passes_a_prompt_settlement_through() {
  let promise = Promise::<i32>::new();
  let guarded = promise.future().timeout(Duration::from_secs(5));

  promise.succeed(8);
  assert_eq!(guarded.wait().into_value(), Some(8));
}

#[test]
fn retry_stops_on_first_success() {
  let attempts = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&attempts);

  let future = retry(5, Duration::from_millis(5), move || {
    let attempt = counter.fetch_add(1, Ordering::SeqCst);
    if attempt < 2 {
      Future::failed(refused())
    } else {
      Future::of(attempt)
    }
  });

  assert_eq!(future.wait().into_value(), Some(2));
  assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[test]
fn retry_exhausts_attempts_and_reports_the_last_failure() {
  let attempts = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&attempts);

  let future = retry(3, Duration::from_millis(5), move || {
    counter.fetch_add(1, Ordering::SeqCst);
    Future::<i32>::failed(refused())
  });

  assert!(future.wait().is_failure());
  // One initial attempt plus three retries.
  assert_eq!(attempts.load(Ordering::SeqCst), 4);
}

#[test]
fn retry_cancelled_during_the_wait_spawns_no_further_attempts() {
  let attempts = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&attempts);

  let future = retry(3, Duration::from_millis(60), move || {
    counter.fetch_add(1, Ordering::SeqCst);
    Future::<i32>::failed(refused())
  });

  // Cancel while the inter-attempt delay is pending.
  std::thread::sleep(Duration::from_millis(10));
  future.cancel();
  assert!(future.wait().is_cancelled());

  // The scheduled re-attempt must observe the settlement and bail out
  // instead of invoking the producing closure again.
  std::thread::sleep(Duration::from_millis(150));
  assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn retry_zero_behaves_as_a_single_attempt() {
  let attempts = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&attempts);

  let future = retry(0, Duration::from_millis(5), move || {
    counter.fetch_add(1, Ordering::SeqCst);
    Future::<i32>::failed(refused())
  });

  assert!(future.wait().is_failure());
  assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn awaited_adapter_bridges_into_async_contexts() {
  let promise = Promise::<i32>::new();
  let awaited = promise.future().awaited();

  let writer = std::thread::spawn(move || {
    std::thread::sleep(Duration::from_millis(20));
    promise.succeed(11);
  });

  assert_eq!(awaited.await.into_value(), Some(11));
  writer.join().unwrap();
}
