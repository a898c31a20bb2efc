mod common;

use common::{Call, ScriptedCache};
use strata_cache::{BuildError, CacheLevel};

#[test]
fn zero_cap_is_rejected_at_construction() {
  let upstream = ScriptedCache::new();
  assert_eq!(upstream.cap_requests(0).err(), Some(BuildError::ZeroCapacity));
}

#[test]
fn reads_beyond_the_cap_wait_for_a_slot() {
  let upstream = ScriptedCache::new();
  let capped = upstream.clone().cap_requests(3).unwrap();

  let reads: Vec<_> = (0..4)
    .map(|n| capped.get(format!("key-{}", n)))
    .collect();
  assert_eq!(upstream.get_count(), 3);

  upstream.succeed_get(1, "early");
  assert_eq!(upstream.get_count(), 4);
  assert_eq!(upstream.get_request(3).0, "key-3");

  upstream.succeed_get(3, "late");
  assert_eq!(reads[3].wait().into_value().as_deref(), Some("late"));
}

#[test]
fn queued_reads_dispatch_in_fifo_order() {
  let upstream = ScriptedCache::new();
  let capped = upstream.clone().cap_requests(1).unwrap();

  let _reads: Vec<_> = ["a", "b", "c"]
    .iter()
    .map(|key| capped.get(key.to_string()))
    .collect();
  assert_eq!(upstream.get_count(), 1);

  upstream.succeed_get(0, "done");
  assert_eq!(upstream.get_request(1).0, "b");

  upstream.succeed_get(1, "done");
  assert_eq!(upstream.get_request(2).0, "c");
}

#[test]
fn a_request_cancelled_while_queued_never_reaches_the_level() {
  let upstream = ScriptedCache::new();
  let capped = upstream.clone().cap_requests(1).unwrap();

  let _in_flight = capped.get("a".to_string());
  let queued = capped.get("b".to_string());
  queued.cancel();
  assert!(queued.wait().is_cancelled());

  upstream.succeed_get(0, "done");

  // The cancelled entry was skipped; a fresh read gets the freed slot.
  let _next = capped.get("c".to_string());
  assert_eq!(
    upstream.recorded(),
    vec![Call::Get("a".to_string()), Call::Get("c".to_string())]
  );
}

#[test]
fn cancelling_an_in_flight_read_forwards_downstream_and_frees_the_slot() {
  let upstream = ScriptedCache::new();
  let capped = upstream.clone().cap_requests(1).unwrap();

  let in_flight = capped.get("a".to_string());
  let queued = capped.get("b".to_string());

  in_flight.cancel();
  assert!(upstream.get_request(0).1.future().wait().is_cancelled());
  assert!(in_flight.wait().is_cancelled());

  // The cancelled settlement releases the slot to the queued read.
  assert_eq!(upstream.get_count(), 2);
  upstream.succeed_get(1, "b-value");
  assert_eq!(queued.wait().into_value().as_deref(), Some("b-value"));
}

#[test]
fn writes_clear_and_memory_warning_bypass_the_cap() {
  let upstream = ScriptedCache::new();
  let capped = upstream.clone().cap_requests(1).unwrap();

  let _in_flight = capped.get("a".to_string());
  let _write = capped.set("value".to_string(), "b".to_string());
  capped.clear();
  capped.on_memory_warning();

  assert_eq!(
    upstream.recorded(),
    vec![
      Call::Get("a".to_string()),
      Call::Set("b".to_string(), "value".to_string()),
      Call::Clear,
      Call::MemoryWarning,
    ]
  );
}
