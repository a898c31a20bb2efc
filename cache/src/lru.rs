use ahash::RandomState;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Recency/cost bookkeeping shared by the bounded levels.
///
/// Front of the order queue is least recently used, back is most recent.
/// The linear move-to-back scan is deliberate: bounded levels hold at most
/// a handful of entries per unit of capacity, and the index is always
/// touched under the level's own lock.
pub(crate) struct LruIndex<K> {
  costs: HashMap<K, u64, RandomState>,
  order: VecDeque<K>,
  total: u64,
}

impl<K: Eq + Hash + Clone> LruIndex<K> {
  pub(crate) fn new() -> Self {
    LruIndex {
      costs: HashMap::default(),
      order: VecDeque::new(),
      total: 0,
    }
  }

  pub(crate) fn total(&self) -> u64 {
    self.total
  }

  pub(crate) fn contains(&self, key: &K) -> bool {
    self.costs.contains_key(key)
  }

  /// Records (or overwrites) `key` at cost `cost` and marks it most
  /// recently used.
  pub(crate) fn insert(&mut self, key: K, cost: u64) {
    if let Some(previous) = self.costs.insert(key.clone(), cost) {
      self.total -= previous;
      self.unlink(&key);
    }
    self.total += cost;
    self.order.push_back(key);
  }

  /// Marks an existing key most recently used; unknown keys are ignored.
  pub(crate) fn touch(&mut self, key: &K) {
    if self.costs.contains_key(key) {
      self.unlink(key);
      self.order.push_back(key.clone());
    }
  }

  pub(crate) fn remove(&mut self, key: &K) -> Option<u64> {
    let cost = self.costs.remove(key)?;
    self.total -= cost;
    self.unlink(key);
    Some(cost)
  }

  /// Pops least-recently-used keys until the total cost fits `capacity`,
  /// never evicting the last remaining entry (the one just written may
  /// legitimately exceed capacity on its own).
  pub(crate) fn evict_over_capacity(&mut self, capacity: u64) -> Vec<K> {
    let mut evicted = Vec::new();
    while self.total > capacity && self.order.len() > 1 {
      if let Some(victim) = self.order.pop_front() {
        if let Some(cost) = self.costs.remove(&victim) {
          self.total -= cost;
        }
        evicted.push(victim);
      }
    }
    evicted
  }

  pub(crate) fn clear(&mut self) -> Vec<K> {
    self.total = 0;
    self.costs.clear();
    self.order.drain(..).collect()
  }

  fn unlink(&mut self, key: &K) {
    if let Some(position) = self.order.iter().position(|entry| entry == key) {
      self.order.remove(position);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn eviction_is_least_recent_first() {
    let mut index = LruIndex::new();
    index.insert("a", 4);
    index.insert("b", 4);
    index.insert("c", 4);
    index.touch(&"a");

    let evicted = index.evict_over_capacity(8);
    assert_eq!(evicted, vec!["b"]);
    assert_eq!(index.total(), 8);
  }

  #[test]
  fn overwrite_replaces_cost_instead_of_accumulating() {
    let mut index = LruIndex::new();
    index.insert("a", 4);
    index.insert("a", 6);
    assert_eq!(index.total(), 6);
  }

  #[test]
  fn sole_oversized_entry_survives() {
    let mut index = LruIndex::new();
    index.insert("a", 100);
    assert!(index.evict_over_capacity(10).is_empty());
    assert!(index.contains(&"a"));
  }
}
