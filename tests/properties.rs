//! Property tests over the read/write surface.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use telltale::{Notify, ObservableMap, StoreOptions};

fn seeded(entries: HashMap<String, i64>) -> ObservableMap<String, i64> {
    ObservableMap::with_options(StoreOptions {
        initial: entries,
        fallback: None,
    })
}

proptest! {
    #[test]
    fn prop_set_then_get_roundtrips(
        entries in proptest::collection::hash_map("[a-d]{1,3}", any::<i64>(), 0..16),
        key in "[a-d]{1,3}",
        value in any::<i64>(),
    ) {
        let store = seeded(entries);
        store.set(key.clone(), value, Notify::Silent);
        prop_assert_eq!(store.get(&key), Some(value));
    }

    #[test]
    fn prop_update_absent_key_is_invisible(
        mut entries in proptest::collection::hash_map("[a-d]{1,3}", any::<i64>(), 0..16),
        key in "[a-d]{1,3}",
    ) {
        entries.remove(&key);
        let store = seeded(entries.clone());

        let applied = store.update(&key, |v| v.wrapping_add(1), Notify::Deliver);

        prop_assert!(!applied);
        prop_assert_eq!(store.len(), entries.len());
        let mut keys = store.keys();
        keys.sort();
        let mut expected: Vec<_> = entries.keys().cloned().collect();
        expected.sort();
        prop_assert_eq!(keys, expected);
        prop_assert_eq!(store.get(&key), None);
    }

    #[test]
    fn prop_remove_shrinks_by_exactly_one(
        entries in proptest::collection::hash_map("[a-d]{1,3}", any::<i64>(), 0..16),
        key in "[a-d]{1,3}",
        value in any::<i64>(),
    ) {
        let store = seeded(entries);
        store.set(key.clone(), value, Notify::Silent);
        let before = store.len();

        store.remove(&key, Notify::Silent);

        prop_assert_eq!(store.len(), before - 1);
        prop_assert!(!store.keys().contains(&key));
    }

    #[test]
    fn prop_filter_partitions_the_key_set(
        entries in proptest::collection::hash_map("[a-d]{1,3}", any::<i64>(), 0..32),
        pivot in any::<i64>(),
    ) {
        let store = seeded(entries);
        let mut all = store.keys();
        let mut partitioned = store.keys_where(|v| *v < pivot);
        partitioned.extend(store.keys_where(|v| *v >= pivot));
        all.sort();
        partitioned.sort();
        prop_assert_eq!(partitioned, all);
    }

    #[test]
    fn prop_notifying_replace_clears_registrations(
        entries in proptest::collection::hash_map("[a-d]{1,3}", any::<i64>(), 0..8),
        subscribers in 0usize..5,
    ) {
        let store = seeded(HashMap::new());
        for _ in 0..subscribers {
            store.subscribe_size(Arc::new(|| {}));
        }
        prop_assert_eq!(store.subscriber_count(), subscribers);

        store.replace(entries.clone(), Notify::Deliver);

        prop_assert_eq!(store.subscriber_count(), 0);
        prop_assert_eq!(store.len(), entries.len());
    }
}
