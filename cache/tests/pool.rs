mod common;

use common::{Call, ScriptedCache};
use strata_cache::CacheLevel;

#[test]
fn concurrent_reads_for_one_key_share_one_upstream_request() {
  let upstream = ScriptedCache::new();
  let pooled = upstream.clone().pooled();

  let first = pooled.get("key".to_string());
  let second = pooled.get("key".to_string());
  assert_eq!(upstream.get_count(), 1);

  upstream.succeed_get(0, "shared");
  assert_eq!(first.wait().into_value().as_deref(), Some("shared"));
  assert_eq!(second.wait().into_value().as_deref(), Some("shared"));
}

#[test]
fn distinct_keys_are_not_coalesced() {
  let upstream = ScriptedCache::new();
  let pooled = upstream.clone().pooled();

  let _a = pooled.get("a".to_string());
  let _b = pooled.get("b".to_string());

  assert_eq!(upstream.get_count(), 2);
}

#[test]
fn a_settled_request_stops_absorbing_new_reads() {
  let upstream = ScriptedCache::new();
  let pooled = upstream.clone().pooled();

  let first = pooled.get("key".to_string());
  upstream.succeed_get(0, "one");
  assert_eq!(first.wait().into_value().as_deref(), Some("one"));

  let second = pooled.get("key".to_string());
  assert_eq!(upstream.get_count(), 2);

  upstream.succeed_get(1, "two");
  assert_eq!(second.wait().into_value().as_deref(), Some("two"));
}

#[test]
fn shared_failures_release_the_key_as_well() {
  let upstream = ScriptedCache::new();
  let pooled = upstream.clone().pooled();

  let first = pooled.get("key".to_string());
  let second = pooled.get("key".to_string());
  upstream.fail_get(0);

  assert!(first.wait().is_failure());
  assert!(second.wait().is_failure());

  let _third = pooled.get("key".to_string());
  assert_eq!(upstream.get_count(), 2);
}

#[test]
fn writes_are_never_deduplicated() {
  let upstream = ScriptedCache::new();
  let pooled = upstream.clone().pooled();

  let _first = pooled.set("v1".to_string(), "key".to_string());
  let _second = pooled.set("v2".to_string(), "key".to_string());

  assert_eq!(upstream.set_count(), 2);
}

#[test]
fn clear_and_memory_warning_pass_straight_through() {
  let upstream = ScriptedCache::new();
  let pooled = upstream.clone().pooled();

  pooled.clear();
  pooled.on_memory_warning();

  assert_eq!(upstream.recorded(), vec![Call::Clear, Call::MemoryWarning]);
}
