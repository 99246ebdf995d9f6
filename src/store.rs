//! The observable map tying registries and scheduling together.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::trace;

use crate::error::{Result, StoreError};
use crate::scheduler::{FlushTask, Scheduler};
use crate::subscriptions::{Channel, Subscriber, SubscriberRegistry, SubscriptionHandle};
use crate::types::{Notify, StoreOptions};

/// Upper bound on `run_until_idle` passes before giving up on callbacks
/// that keep scheduling more work.
const MAX_FLUSH_PASSES: usize = 64;

/// A typed mapping with four observable facets.
///
/// Consumers subscribe to a single item, the entry count, the key list, or
/// the filtered key list, and are notified after mutations instead of
/// re-evaluating on every write. Notifications are never delivered inside
/// the mutator call; they queue until the owner runs [`flush`](Self::flush)
/// at the end of the current turn.
///
/// The store knows nothing about rendering. The [`binding`](crate::binding)
/// module adapts it to any reactive UI runtime.
pub struct ObservableMap<K, V> {
    /// Backing map. Held briefly; never locked across user code from the
    /// flush path.
    map: RwLock<HashMap<K, V>>,

    /// Value returned for reads of absent keys.
    fallback: Option<V>,

    /// The four subscriber registries.
    subscribers: Arc<SubscriberRegistry<K>>,

    /// Deferred notification queue.
    scheduler: Scheduler,
}

impl<K, V> ObservableMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty store with no fallback value.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Create a store seeded from [`StoreOptions`].
    pub fn with_options(options: StoreOptions<K, V>) -> Self {
        Self {
            map: RwLock::new(options.initial),
            fallback: options.fallback,
            subscribers: Arc::new(SubscriberRegistry::new()),
            scheduler: Scheduler::new(),
        }
    }

    // --- Read Operations ---

    /// Value stored under `key`, else the fallback, else `None`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.map
            .read()
            .get(key)
            .cloned()
            .or_else(|| self.fallback.clone())
    }

    /// Current entry count.
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    /// All keys, snapshot at call time. No order contract.
    pub fn keys(&self) -> Vec<K> {
        self.map.read().keys().cloned().collect()
    }

    /// Keys whose live value satisfies `predicate` at call time.
    ///
    /// The predicate runs under the store's read lock and must not call
    /// back into the store's mutators.
    pub fn keys_where<F>(&self, predicate: F) -> Vec<K>
    where
        F: Fn(&V) -> bool,
    {
        self.map
            .read()
            .iter()
            .filter(|(_, value)| predicate(value))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// The live backing map, for low-level read access.
    pub fn map(&self) -> RwLockReadGuard<'_, HashMap<K, V>> {
        self.map.read()
    }

    /// The live backing map, writable.
    ///
    /// Writes through this guard bypass change detection entirely; only
    /// the store's own mutators schedule notifications.
    pub fn map_mut(&self) -> RwLockWriteGuard<'_, HashMap<K, V>> {
        self.map.write()
    }

    // --- Write Operations ---

    /// Unconditional insert or overwrite.
    ///
    /// On [`Notify::Deliver`] schedules the item channel for `key` plus the
    /// size, key-list and filtered-key-list channels. Size and key-list
    /// fire even when the key already existed; callers needing precision
    /// should watch the item channel alone.
    pub fn set(&self, key: K, value: V, notify: Notify) {
        self.map.write().insert(key.clone(), value);

        if notify.deliver() {
            self.sync_items(std::slice::from_ref(&key));
            self.sync_channel(Channel::Size);
            self.sync_channel(Channel::Keys);
            self.sync_channel(Channel::FilteredKeys);
        }
    }

    /// Transform the value under `key`. No-op on absent keys: returns
    /// `false` without creating the entry.
    ///
    /// The transform receives a clone of the current value, never the
    /// stored value itself, so partially-built state is unobservable.
    /// Partial patches are the struct-update form of the same closure:
    /// `store.update(&k, |prev| V { field, ..prev }, Notify::Deliver)`.
    ///
    /// Schedules the item channel for `key` and the filtered-key-list
    /// channel only; no key was added or removed.
    pub fn update<F>(&self, key: &K, transform: F, notify: Notify) -> bool
    where
        F: FnOnce(V) -> V,
    {
        let current = match self.map.read().get(key) {
            Some(value) => value.clone(),
            None => return false,
        };
        let next = transform(current);
        self.map.write().insert(key.clone(), next);

        if notify.deliver() {
            self.sync_items(std::slice::from_ref(key));
            self.sync_channel(Channel::FilteredKeys);
        }
        true
    }

    /// Apply `update` semantics for each `(key, value)` pair without
    /// notifying, then run one batched item pass over every patch key plus
    /// one filtered-key-list firing.
    ///
    /// Keys absent from the store are silently skipped; this is not an
    /// upsert. Skipped keys still take part in the item pass, so a
    /// subscriber watching an absent key observes the attempt.
    pub fn update_many<I>(&self, entries: I, notify: Notify)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut touched = Vec::new();
        for (key, value) in entries {
            self.update(&key, |_| value, Notify::Silent);
            touched.push(key);
        }

        if notify.deliver() {
            self.sync_items(&touched);
            self.sync_channel(Channel::FilteredKeys);
        }
    }

    /// Wholesale replacement of the backing map.
    ///
    /// A replace changes what every key means, so on [`Notify::Deliver`]
    /// all four registries are cleared before the sweep runs; the sweep
    /// and channel syncs reach only what is registered after the clear,
    /// which in practice is nobody. Callers that need live subscriptions
    /// across a replace must resubscribe afterwards.
    pub fn replace(&self, new_map: HashMap<K, V>, notify: Notify) {
        *self.map.write() = new_map;
        trace!(size = self.len(), "backing map replaced");

        if notify.deliver() {
            self.subscribers.clear_all();
            self.sync_sweep();
            self.sync_channel(Channel::Size);
            self.sync_channel(Channel::Keys);
            self.sync_channel(Channel::FilteredKeys);
        }
    }

    /// Delete `key` if present; no error when absent.
    ///
    /// Schedules the item channel for `key` (so its subscribers observe
    /// the transition to the fallback value) plus size, key-list and
    /// filtered-key-list, whether or not the key existed.
    pub fn remove(&self, key: &K, notify: Notify) -> Option<V> {
        let removed = self.map.write().remove(key);

        if notify.deliver() {
            self.sync_items(std::slice::from_ref(key));
            self.sync_channel(Channel::Size);
            self.sync_channel(Channel::Keys);
            self.sync_channel(Channel::FilteredKeys);
        }
        removed
    }

    // --- Subscriptions ---

    /// Watch the value under one key.
    pub fn subscribe_item(&self, key: K, subscriber: Subscriber) -> SubscriptionHandle
    where
        K: Send + Sync + 'static,
    {
        let id = self.subscribers.subscribe_item(key.clone(), subscriber);
        trace!(total = self.subscribers.subscriber_count(), "item subscriber added");

        let registry = Arc::downgrade(&self.subscribers);
        SubscriptionHandle::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.unsubscribe_item(&key, id);
            }
        })
    }

    /// Watch the entry count.
    pub fn subscribe_size(&self, subscriber: Subscriber) -> SubscriptionHandle
    where
        K: Send + Sync + 'static,
    {
        self.subscribe_channel(Channel::Size, subscriber)
    }

    /// Watch the unfiltered key set.
    pub fn subscribe_keys(&self, subscriber: Subscriber) -> SubscriptionHandle
    where
        K: Send + Sync + 'static,
    {
        self.subscribe_channel(Channel::Keys, subscriber)
    }

    /// Watch for any mutation that could change a filtered key list.
    pub fn subscribe_filtered_keys(&self, subscriber: Subscriber) -> SubscriptionHandle
    where
        K: Send + Sync + 'static,
    {
        self.subscribe_channel(Channel::FilteredKeys, subscriber)
    }

    /// Watch one of the store-global channels directly.
    pub fn subscribe_channel(&self, channel: Channel, subscriber: Subscriber) -> SubscriptionHandle
    where
        K: Send + Sync + 'static,
    {
        let id = self.subscribers.subscribe_channel(channel, subscriber);
        trace!(?channel, total = self.subscribers.subscriber_count(), "subscriber added");

        let registry = Arc::downgrade(&self.subscribers);
        SubscriptionHandle::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.unsubscribe_channel(channel, id);
            }
        })
    }

    /// Total registrations across all four channels.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.subscriber_count()
    }

    // --- Delivery ---

    /// Deliver the notifications queued before this call began.
    ///
    /// Returns the number of callbacks invoked. Work scheduled by those
    /// callbacks stays queued for the next turn. Refuses to run from
    /// inside a delivering callback.
    pub fn flush(&self) -> Result<usize> {
        self.scheduler
            .flush(|channel| self.subscribers.channel_snapshot(channel))
    }

    /// Run flush turns until the queue is quiet.
    pub fn run_until_idle(&self) -> Result<usize> {
        let mut delivered = 0;
        let mut passes = 0;
        while self.scheduler.pending() > 0 {
            passes += 1;
            if passes > MAX_FLUSH_PASSES {
                return Err(StoreError::UnsettledFlush {
                    limit: MAX_FLUSH_PASSES,
                });
            }
            delivered += self.flush()?;
        }
        Ok(delivered)
    }

    /// Number of queued, undelivered flush tasks.
    pub fn pending_notifications(&self) -> usize {
        self.scheduler.pending()
    }

    // --- Sync helpers ---

    /// Capture the callbacks watching `keys` into one scheduled batch.
    fn sync_items(&self, keys: &[K]) {
        let batch = self.subscribers.item_batch(keys);
        if !batch.is_empty() {
            self.scheduler.schedule(FlushTask::Batch(batch));
        }
    }

    /// Capture every per-item callback (the replace sweep).
    fn sync_sweep(&self) {
        let batch = self.subscribers.sweep_batch();
        if !batch.is_empty() {
            self.scheduler.schedule(FlushTask::Batch(batch));
        }
    }

    /// Schedule a global channel if anyone is listening right now. The
    /// channel is resolved against the live registry again at flush time.
    fn sync_channel(&self, channel: Channel) {
        if !self.subscribers.channel_is_empty(channel) {
            self.scheduler.schedule(FlushTask::Channel(channel));
        }
    }
}

impl<K, V> Default for ObservableMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
