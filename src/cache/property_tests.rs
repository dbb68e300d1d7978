//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against simple reference models and
//! to verify its internal structures stay consistent under random traffic.

use proptest::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{CacheStore, EvictionPolicy, KeyIndex, MAX_KEY_LENGTH};
use crate::config::Config;

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_TTL_MS: u64 = 300_000;

// == Strategies ==
/// Generates valid cache keys (non-empty, within length limit)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,64}"
}

/// Keys drawn from a small pool so operations collide often
fn pooled_key_strategy() -> impl Strategy<Value = String> {
    "k[0-9]{1,2}"
}

/// Generates valid cache values (no whitespace)
fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.-]{1,128}"
}

fn policy_strategy() -> impl Strategy<Value = EvictionPolicy> {
    prop::sample::select(EvictionPolicy::ALL.to_vec())
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: String },
    Get { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (pooled_key_strategy(), valid_value_strategy())
            .prop_map(|(key, value)| CacheOp::Put { key, value }),
        pooled_key_strategy().prop_map(|key| CacheOp::Get { key }),
    ]
}

fn store(capacity: usize, policy: EvictionPolicy) -> CacheStore {
    let config = Config::new(capacity, policy)
        .without_persistence()
        .with_lru_frequency_threshold(None);
    CacheStore::from_config(&config).unwrap()
}

/// Reference recency/insertion order; front is the next victim.
struct OrderModel {
    order: VecDeque<String>,
    values: HashMap<String, String>,
    capacity: usize,
    reorder_on_access: bool,
}

impl OrderModel {
    fn new(capacity: usize, reorder_on_access: bool) -> Self {
        Self {
            order: VecDeque::new(),
            values: HashMap::new(),
            capacity,
            reorder_on_access,
        }
    }

    fn touch(&mut self, key: &str) {
        if self.reorder_on_access {
            if let Some(pos) = self.order.iter().position(|k| k == key) {
                if let Some(k) = self.order.remove(pos) {
                    self.order.push_back(k);
                }
            }
        }
    }

    fn put(&mut self, key: &str, value: &str) {
        if self.values.contains_key(key) {
            self.touch(key);
        } else {
            if self.order.len() >= self.capacity {
                if let Some(victim) = self.order.pop_front() {
                    self.values.remove(&victim);
                }
            }
            self.order.push_back(key.to_string());
        }
        self.values.insert(key.to_string(), value.to_string());
    }

    fn get(&mut self, key: &str) -> Option<String> {
        let value = self.values.get(key).cloned();
        if value.is_some() {
            self.touch(key);
        }
        value
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Statistics track every lookup and the live entry count.
    #[test]
    fn prop_statistics_accuracy(
        policy in policy_strategy(),
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut store = store(8, policy);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    store.put(&key, &value, TEST_TTL_MS).unwrap();
                }
                CacheOp::Get { key } => match store.get(&key).unwrap() {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "Total entries mismatch");
    }

    // Index, arena, eviction structure and expiry tracker agree after any
    // sequence of operations, under every policy.
    #[test]
    fn prop_structures_stay_consistent(
        policy in policy_strategy(),
        capacity in 1usize..12,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let mut store = store(capacity, policy);

        for op in ops {
            match op {
                CacheOp::Put { key, value } => store.put(&key, &value, TEST_TTL_MS).unwrap(),
                CacheOp::Get { key } => {
                    store.get(&key).unwrap();
                }
            }
            store.check_invariants();
        }
    }

    // Storing a pair and reading it back before expiry returns the same value.
    #[test]
    fn prop_roundtrip_storage(
        policy in policy_strategy(),
        key in valid_key_strategy(),
        value in valid_value_strategy()
    ) {
        let mut store = store(TEST_MAX_ENTRIES, policy);

        store.put(&key, &value, TEST_TTL_MS).unwrap();

        let retrieved = store.get(&key).unwrap();
        prop_assert_eq!(retrieved, Some(value), "Round-trip value mismatch");
    }

    // A second put replaces the value without adding an entry.
    #[test]
    fn prop_overwrite_semantics(
        policy in policy_strategy(),
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        let mut store = store(TEST_MAX_ENTRIES, policy);

        store.put(&key, &value1, TEST_TTL_MS).unwrap();
        store.put(&key, &value2, TEST_TTL_MS).unwrap();

        let retrieved = store.get(&key).unwrap();
        prop_assert_eq!(retrieved, Some(value2), "Overwrite should return new value");
        prop_assert_eq!(store.len(), 1, "Should have exactly one entry after overwrite");
    }

    // The number of entries never exceeds capacity.
    #[test]
    fn prop_capacity_enforcement(
        policy in policy_strategy(),
        entries in prop::collection::vec(
            (valid_key_strategy(), valid_value_strategy()),
            1..200
        )
    ) {
        let max_entries = 50;
        let mut store = store(max_entries, policy);

        for (key, value) in entries {
            store.put(&key, &value, TEST_TTL_MS).unwrap();
            prop_assert!(
                store.len() <= max_entries,
                "Cache size {} exceeds max {}",
                store.len(),
                max_entries
            );
        }
    }

    // FIFO and plain LRU match a queue model exactly.
    #[test]
    fn prop_order_policies_match_model(
        lru in any::<bool>(),
        capacity in 1usize..8,
        ops in prop::collection::vec(cache_op_strategy(), 1..150)
    ) {
        let policy = if lru { EvictionPolicy::Lru } else { EvictionPolicy::Fifo };
        let mut store = store(capacity, policy);
        let mut model = OrderModel::new(capacity, lru);

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    store.put(&key, &value, TEST_TTL_MS).unwrap();
                    model.put(&key, &value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(store.get(&key).unwrap(), model.get(&key), "get({})", key);
                }
            }
            prop_assert_eq!(store.len(), model.values.len());
        }
    }

    // Over-long keys are rejected without touching the store.
    #[test]
    fn prop_oversized_key_rejected(extra in 1usize..64, value in valid_value_strategy()) {
        let mut store = store(TEST_MAX_ENTRIES, EvictionPolicy::Lru);
        let key = "k".repeat(MAX_KEY_LENGTH + extra);

        prop_assert!(store.put(&key, &value, TEST_TTL_MS).is_err());
        prop_assert!(store.is_empty());
    }

    // The key index finds every live key and keeps a power-of-two table.
    #[test]
    fn prop_index_matches_hashmap(
        ops in prop::collection::vec((pooled_key_strategy(), any::<bool>()), 1..300)
    ) {
        use crate::cache::{Entry, EntryArena, EntryId};

        let mut entries = EntryArena::new();
        let mut index = KeyIndex::new();
        let mut model: HashMap<String, EntryId> = HashMap::new();

        for (key, insert) in ops {
            if insert {
                let id = entries.insert(Entry::new(&key, "v", u64::MAX));
                let previous = index.insert(id, &entries).unwrap();
                prop_assert_eq!(previous, model.insert(key, id));
                if let Some(old) = previous {
                    entries.remove(old);
                }
            } else {
                let removed = index.remove(&key, &entries).unwrap();
                prop_assert_eq!(removed, model.remove(&key));
                if let Some(id) = removed {
                    entries.remove(id);
                }
            }
            prop_assert_eq!(index.len(), model.len());
            prop_assert_eq!(entries.len(), model.len());
            prop_assert!(index.bucket_count().is_power_of_two());
            prop_assert!(index.len() * 4 <= index.bucket_count() * 3 + 4);
        }

        for (key, id) in &model {
            prop_assert_eq!(index.get(key, &entries).unwrap(), Some(*id));
        }
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // An entry read after its TTL has elapsed is reported absent and removed.
    #[test]
    fn prop_ttl_expiration_behavior(
        policy in policy_strategy(),
        key in valid_key_strategy(),
        value in valid_value_strategy()
    ) {
        let mut store = store(TEST_MAX_ENTRIES, policy);

        store.put(&key, &value, 40).unwrap();
        prop_assert_eq!(store.get(&key).unwrap(), Some(value), "Value should match before expiration");

        sleep(Duration::from_millis(70));

        prop_assert_eq!(store.get(&key).unwrap(), None, "Entry should not be found after TTL expires");
        prop_assert!(store.is_empty());
        store.check_invariants();
    }
}

// Property tests for LRU eviction behavior
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Filling to capacity and adding one more evicts the oldest key.
    #[test]
    fn prop_lru_eviction_order(
        initial_keys in prop::collection::hash_set(valid_key_strategy(), 2..10),
        new_key in valid_key_strategy(),
        new_value in valid_value_strategy()
    ) {
        let unique_keys: Vec<String> = initial_keys.into_iter().collect();
        prop_assume!(!unique_keys.contains(&new_key));

        let capacity = unique_keys.len();
        let mut store = store(capacity, EvictionPolicy::Lru);

        // First key added will be oldest (LRU candidate)
        let oldest_key = unique_keys[0].clone();
        for key in &unique_keys {
            store.put(key, &format!("value_{}", key), TEST_TTL_MS).unwrap();
        }
        prop_assert_eq!(store.len(), capacity, "Cache should be at capacity");

        store.put(&new_key, &new_value, TEST_TTL_MS).unwrap();

        prop_assert_eq!(store.len(), capacity, "Cache should remain at capacity after eviction");
        prop_assert!(
            store.get(&oldest_key).unwrap().is_none(),
            "Oldest key '{}' should have been evicted",
            oldest_key
        );
        prop_assert!(store.get(&new_key).unwrap().is_some(), "New key should exist");
        for key in unique_keys.iter().skip(1) {
            prop_assert!(
                store.get(key).unwrap().is_some(),
                "Key '{}' should still exist (not the oldest)",
                key
            );
        }
    }

    // A read makes the key most recently used, so the next-oldest goes.
    #[test]
    fn prop_lru_access_tracking(
        keys in prop::collection::hash_set(valid_key_strategy(), 3..8),
        new_key in valid_key_strategy(),
        new_value in valid_value_strategy()
    ) {
        let unique_keys: Vec<String> = keys.into_iter().collect();
        prop_assume!(!unique_keys.contains(&new_key));

        let capacity = unique_keys.len();
        let mut store = store(capacity, EvictionPolicy::Lru);
        for key in &unique_keys {
            store.put(key, &format!("value_{}", key), TEST_TTL_MS).unwrap();
        }

        let accessed_key = unique_keys[0].clone();
        store.get(&accessed_key).unwrap();
        let expected_evicted = unique_keys[1].clone();

        store.put(&new_key, &new_value, TEST_TTL_MS).unwrap();

        prop_assert!(
            store.get(&accessed_key).unwrap().is_some(),
            "Accessed key '{}' should not be evicted after being touched",
            accessed_key
        );
        prop_assert!(
            store.get(&expected_evicted).unwrap().is_none(),
            "Key '{}' should have been evicted as it was oldest after access",
            expected_evicted
        );
    }

    // LFU never evicts the only key that was read while colder keys remain.
    #[test]
    fn prop_lfu_keeps_hot_key(
        keys in prop::collection::hash_set(valid_key_strategy(), 2..8),
        reads in 1usize..6,
        new_keys in prop::collection::hash_set("n[0-9]{1,3}", 1..12)
    ) {
        let unique_keys: Vec<String> = keys.into_iter().collect();
        let capacity = unique_keys.len();
        prop_assume!(new_keys.iter().all(|k| !unique_keys.contains(k)));

        let mut store = store(capacity, EvictionPolicy::Lfu);
        for key in &unique_keys {
            store.put(key, "v", TEST_TTL_MS).unwrap();
        }
        for _ in 0..reads {
            store.get(&unique_keys[0]).unwrap();
        }
        for key in &new_keys {
            store.put(key, "v", TEST_TTL_MS).unwrap();
        }

        prop_assert_eq!(store.len(), capacity);
        prop_assert!(store.get(&unique_keys[0]).unwrap().is_some());
    }
}
