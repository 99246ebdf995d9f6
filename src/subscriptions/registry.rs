//! Subscriber registries for the four notification channels.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;

use super::types::{Channel, Subscriber, SubscriberId};

/// Insertion set of subscribers keyed by referential identity.
#[derive(Default)]
pub(crate) struct SubscriberSet {
    entries: HashMap<SubscriberId, Subscriber>,
}

impl SubscriberSet {
    /// Add a subscriber. Re-adding the same `Arc` keeps one entry.
    fn insert(&mut self, subscriber: Subscriber) -> SubscriberId {
        let id = SubscriberId::of(&subscriber);
        self.entries.insert(id, subscriber);
        id
    }

    fn remove(&mut self, id: SubscriberId) {
        self.entries.remove(&id);
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn snapshot(&self) -> Vec<Subscriber> {
        self.entries.values().cloned().collect()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The four independent subscriber registries of one store instance.
///
/// Locks are held only while reading or editing a registry, never while a
/// subscriber callback runs.
pub(crate) struct SubscriberRegistry<K> {
    item: RwLock<HashMap<K, SubscriberSet>>,
    size: RwLock<SubscriberSet>,
    keys: RwLock<SubscriberSet>,
    filtered_keys: RwLock<SubscriberSet>,
}

impl<K> SubscriberRegistry<K>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new() -> Self {
        Self {
            item: RwLock::new(HashMap::new()),
            size: RwLock::new(SubscriberSet::default()),
            keys: RwLock::new(SubscriberSet::default()),
            filtered_keys: RwLock::new(SubscriberSet::default()),
        }
    }

    fn channel(&self, channel: Channel) -> &RwLock<SubscriberSet> {
        match channel {
            Channel::Size => &self.size,
            Channel::Keys => &self.keys,
            Channel::FilteredKeys => &self.filtered_keys,
        }
    }

    // --- Registration ---

    pub(crate) fn subscribe_item(&self, key: K, subscriber: Subscriber) -> SubscriberId {
        self.item.write().entry(key).or_default().insert(subscriber)
    }

    /// Remove one per-item registration. Empty per-key sets are dropped so
    /// the registry does not accumulate keys nobody watches.
    pub(crate) fn unsubscribe_item(&self, key: &K, id: SubscriberId) {
        let mut item = self.item.write();
        if let Some(set) = item.get_mut(key) {
            set.remove(id);
            if set.is_empty() {
                item.remove(key);
            }
        }
    }

    pub(crate) fn subscribe_channel(&self, channel: Channel, subscriber: Subscriber) -> SubscriberId {
        self.channel(channel).write().insert(subscriber)
    }

    pub(crate) fn unsubscribe_channel(&self, channel: Channel, id: SubscriberId) {
        self.channel(channel).write().remove(id);
    }

    // --- Batches ---

    /// Callbacks interested in any of `keys`, captured now.
    pub(crate) fn item_batch(&self, keys: &[K]) -> Vec<Subscriber> {
        let item = self.item.read();
        let mut batch = Vec::new();
        for key in keys {
            if let Some(set) = item.get(key) {
                batch.extend(set.snapshot());
            }
        }
        batch
    }

    /// Every per-item callback across all keys, captured now.
    pub(crate) fn sweep_batch(&self) -> Vec<Subscriber> {
        let item = self.item.read();
        let mut batch = Vec::new();
        for set in item.values() {
            batch.extend(set.snapshot());
        }
        batch
    }

    /// Current callbacks of a global channel.
    pub(crate) fn channel_snapshot(&self, channel: Channel) -> Vec<Subscriber> {
        self.channel(channel).read().snapshot()
    }

    pub(crate) fn channel_is_empty(&self, channel: Channel) -> bool {
        self.channel(channel).read().is_empty()
    }

    /// Drop every registration on all four registries.
    pub(crate) fn clear_all(&self) {
        self.item.write().clear();
        self.size.write().clear();
        self.keys.write().clear();
        self.filtered_keys.write().clear();
    }

    /// Total registrations across all four registries.
    pub(crate) fn subscriber_count(&self) -> usize {
        let per_item: usize = self.item.read().values().map(SubscriberSet::len).sum();
        per_item
            + self.size.read().len()
            + self.keys.read().len()
            + self.filtered_keys.read().len()
    }

    #[cfg(test)]
    pub(crate) fn watched_key_count(&self) -> usize {
        self.item.read().len()
    }
}
