mod common;

use common::{Call, ScriptedCache};
use strata_cache::CacheLevel;

#[test]
fn fronting_hit_never_touches_the_second_level() {
  let first = ScriptedCache::new();
  let second = ScriptedCache::new();
  let stack = first.clone().compose(second.clone());

  let read = stack.get("key".to_string());
  first.succeed_get(0, "hit");

  assert_eq!(read.wait().into_value().as_deref(), Some("hit"));
  assert!(second.recorded().is_empty());
}

#[test]
fn fallback_hit_reaches_the_caller_and_writes_back() {
  let first = ScriptedCache::new();
  let second = ScriptedCache::new();
  let stack = first.clone().compose(second.clone());

  let read = stack.get("key".to_string());
  first.fail_get(0);
  second.succeed_get(0, "recovered");

  assert_eq!(read.wait().into_value().as_deref(), Some("recovered"));
  assert_eq!(
    first.recorded(),
    vec![
      Call::Get("key".to_string()),
      Call::Set("key".to_string(), "recovered".to_string()),
    ]
  );
}

#[test]
fn write_back_failure_does_not_reach_the_caller() {
  let first = ScriptedCache::new();
  let second = ScriptedCache::new();
  let stack = first.clone().compose(second.clone());

  let read = stack.get("key".to_string());
  first.fail_get(0);
  second.succeed_get(0, "recovered");
  first.set_request(0).fail(common::test_error());

  assert_eq!(read.wait().into_value().as_deref(), Some("recovered"));
}

#[test]
fn fronting_cancellation_is_terminal() {
  let first = ScriptedCache::new();
  let second = ScriptedCache::new();
  let stack = first.clone().compose(second.clone());

  let read = stack.get("key".to_string());
  first.get_request(0).1.cancel();

  assert!(read.wait().is_cancelled());
  assert!(second.recorded().is_empty());
}

#[test]
fn fallback_failure_fails_the_caller() {
  let first = ScriptedCache::new();
  let second = ScriptedCache::new();
  let stack = first.clone().compose(second.clone());

  let read = stack.get("key".to_string());
  first.fail_get(0);
  second.fail_get(0);

  assert!(read.wait().is_failure());
  // No write-back on a miss of both levels.
  assert_eq!(first.set_count(), 0);
}

#[test]
fn cancelling_the_composed_read_cancels_the_outstanding_sub_request() {
  let first = ScriptedCache::new();
  let second = ScriptedCache::new();
  let stack = first.clone().compose(second.clone());

  let read = stack.get("key".to_string());
  read.cancel();

  assert!(first.get_request(0).1.future().wait().is_cancelled());
  assert!(second.recorded().is_empty());

  // Same once the request has moved on to the fallback level.
  let later = stack.get("other".to_string());
  first.fail_get(1);
  later.cancel();
  assert!(second.get_request(0).1.future().wait().is_cancelled());
}

#[test]
fn set_goes_to_the_second_level_only_after_the_first_succeeds() {
  let first = ScriptedCache::new();
  let second = ScriptedCache::new();
  let stack = first.clone().compose(second.clone());

  let write = stack.set("value".to_string(), "key".to_string());
  assert_eq!(second.set_count(), 0);

  first.succeed_set(0);
  assert_eq!(
    second.recorded(),
    vec![Call::Set("key".to_string(), "value".to_string())]
  );

  second.succeed_set(0);
  assert!(write.wait().is_success());
}

#[test]
fn set_failure_in_the_first_level_skips_the_second() {
  let first = ScriptedCache::new();
  let second = ScriptedCache::new();
  let stack = first.clone().compose(second.clone());

  let write = stack.set("value".to_string(), "key".to_string());
  first.set_request(0).fail(common::test_error());

  assert!(write.wait().is_failure());
  assert!(second.recorded().is_empty());
}

#[test]
fn clear_and_memory_warning_broadcast() {
  let first = ScriptedCache::new();
  let second = ScriptedCache::new();
  let stack = first.clone().compose(second.clone());

  stack.clear();
  stack.on_memory_warning();

  assert_eq!(first.recorded(), vec![Call::Clear, Call::MemoryWarning]);
  assert_eq!(second.recorded(), vec![Call::Clear, Call::MemoryWarning]);
}
