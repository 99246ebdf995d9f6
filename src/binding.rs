//! The seam between the store and a rendering layer.
//!
//! A reactive UI runtime binds to external state through a pair of
//! capabilities: subscribe to invalidation, and read a snapshot. The
//! [`Binding`] trait is that pair; the three concrete bindings compose the
//! store's subscribe entry points with snapshot caching so that an
//! unchanged snapshot compares (or points) equal to the previous one,
//! which is what re-render loops key off.
//!
//! Nothing here is required to use the store; any other binding mechanism
//! can be built from the same public subscribe/read surface.

use parking_lot::Mutex;
use std::hash::Hash;
use std::sync::Arc;

use crate::store::ObservableMap;
use crate::subscriptions::{Subscriber, SubscriptionHandle};

/// Predicate over live values used by [`KeysBinding`].
pub type KeyFilter<V> = Arc<dyn Fn(&V) -> bool + Send + Sync + 'static>;

/// External-store capability: invalidation plus snapshot.
///
/// `subscriber` is the runtime's "something changed, re-read" callback;
/// `snapshot` must be cheap and stable while the underlying slice is
/// unchanged.
pub trait Binding {
    type Snapshot;

    fn subscribe(&self, subscriber: Subscriber) -> SubscriptionHandle;

    fn snapshot(&self) -> Self::Snapshot;
}

/// Live view of one key's value.
pub struct ItemBinding<K, V> {
    store: Arc<ObservableMap<K, V>>,
    key: K,
    last: Mutex<Option<V>>,
}

impl<K, V> Binding for ItemBinding<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + PartialEq,
{
    type Snapshot = Option<V>;

    fn subscribe(&self, subscriber: Subscriber) -> SubscriptionHandle {
        self.store.subscribe_item(self.key.clone(), subscriber)
    }

    /// Current value under the key (fallback included), cached so an
    /// unchanged value yields the previous snapshot.
    fn snapshot(&self) -> Option<V> {
        let current = self.store.get(&self.key);
        let mut last = self.last.lock();
        if *last != current {
            *last = current;
        }
        last.clone()
    }
}

/// Live view of the entry count.
pub struct SizeBinding<K, V> {
    store: Arc<ObservableMap<K, V>>,
}

impl<K, V> Binding for SizeBinding<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone,
{
    type Snapshot = usize;

    fn subscribe(&self, subscriber: Subscriber) -> SubscriptionHandle {
        self.store.subscribe_size(subscriber)
    }

    fn snapshot(&self) -> usize {
        self.store.len()
    }
}

/// Live view of the key list, optionally filtered by a value predicate.
///
/// With a filter it subscribes to the filtered-key-list channel, without
/// one to the key-list channel; value-only mutations therefore invalidate
/// filtered views but not unfiltered ones.
pub struct KeysBinding<K, V> {
    store: Arc<ObservableMap<K, V>>,
    filter: Option<KeyFilter<V>>,
    last: Mutex<Arc<[K]>>,
}

impl<K, V> Binding for KeysBinding<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone,
{
    type Snapshot = Arc<[K]>;

    fn subscribe(&self, subscriber: Subscriber) -> SubscriptionHandle {
        match &self.filter {
            Some(_) => self.store.subscribe_filtered_keys(subscriber),
            None => self.store.subscribe_keys(subscriber),
        }
    }

    /// Current (possibly filtered) key list. The cached `Arc` is swapped
    /// only when the sequence actually changed, so an unchanged snapshot
    /// is pointer-equal to the previous one.
    fn snapshot(&self) -> Arc<[K]> {
        let current = match &self.filter {
            Some(filter) => self.store.keys_where(|value| filter(value)),
            None => self.store.keys(),
        };

        let mut last = self.last.lock();
        let unchanged =
            last.len() == current.len() && last.iter().zip(current.iter()).all(|(a, b)| a == b);
        if !unchanged {
            *last = current.into();
        }
        Arc::clone(&last)
    }
}

impl<K, V> ObservableMap<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone,
{
    /// Binding over the value stored under `key`.
    pub fn bind_item(self: &Arc<Self>, key: K) -> ItemBinding<K, V> {
        ItemBinding {
            store: Arc::clone(self),
            key,
            last: Mutex::new(None),
        }
    }

    /// Binding over the entry count.
    pub fn bind_size(self: &Arc<Self>) -> SizeBinding<K, V> {
        SizeBinding {
            store: Arc::clone(self),
        }
    }

    /// Binding over the key list; pass a filter to track only keys whose
    /// value satisfies it.
    pub fn bind_keys(self: &Arc<Self>, filter: Option<KeyFilter<V>>) -> KeysBinding<K, V> {
        KeysBinding {
            store: Arc::clone(self),
            filter,
            last: Mutex::new(Arc::from(Vec::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Notify;

    #[test]
    fn test_item_binding_snapshot_tracks_value_and_fallback() {
        let store = Arc::new(ObservableMap::new());
        store.set("x", 10, Notify::Silent);

        let binding = store.bind_item("x");
        assert_eq!(binding.snapshot(), Some(10));

        store.set("x", 11, Notify::Silent);
        assert_eq!(binding.snapshot(), Some(11));

        store.remove(&"x", Notify::Silent);
        assert_eq!(binding.snapshot(), None);
    }

    #[test]
    fn test_keys_snapshot_is_pointer_stable_when_unchanged() {
        let store = Arc::new(ObservableMap::new());
        store.set("a", 1, Notify::Silent);
        store.set("b", 2, Notify::Silent);

        let binding = store.bind_keys(None);
        let first = binding.snapshot();
        let second = binding.snapshot();
        assert!(Arc::ptr_eq(&first, &second));

        store.set("c", 3, Notify::Silent);
        let third = binding.snapshot();
        assert!(!Arc::ptr_eq(&second, &third));
        assert_eq!(third.len(), 3);
    }

    #[test]
    fn test_filtered_binding_follows_value_mutations() {
        let store = Arc::new(ObservableMap::new());
        store.set("a", 1, Notify::Silent);
        store.set("b", 2, Notify::Silent);

        let filtered = store.bind_keys(Some(Arc::new(|v: &i32| *v > 1)));
        assert_eq!(filtered.snapshot().len(), 1);

        store.update(&"a", |_| 5, Notify::Silent);
        assert_eq!(filtered.snapshot().len(), 2);
    }

    #[test]
    fn test_bindings_route_to_their_channels() {
        let store = Arc::new(ObservableMap::new());
        store.set("a", 1, Notify::Silent);

        let dirty = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let mark = {
            let dirty = Arc::clone(&dirty);
            Arc::new(move || dirty.store(true, std::sync::atomic::Ordering::SeqCst)) as Subscriber
        };

        let unfiltered = store.bind_keys(None);
        let handle = unfiltered.subscribe(mark.clone());

        // A value-only mutation does not touch the key-list channel.
        store.update(&"a", |v| v + 1, Notify::Deliver);
        store.flush().unwrap();
        assert!(!dirty.load(std::sync::atomic::Ordering::SeqCst));
        handle.unsubscribe();

        let filtered = store.bind_keys(Some(Arc::new(|v: &i32| *v > 0)));
        let _handle = filtered.subscribe(mark);
        store.update(&"a", |v| v + 1, Notify::Deliver);
        store.flush().unwrap();
        assert!(dirty.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_size_binding_reads_len() {
        let store = Arc::new(ObservableMap::new());
        let binding = store.bind_size();
        assert_eq!(binding.snapshot(), 0);

        store.set("a", 1, Notify::Silent);
        assert_eq!(binding.snapshot(), 1);
    }
}
