//! Subscription types for live store updates.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A subscriber callback.
///
/// Subscribers receive no payload; they are expected to re-read live store
/// state (`get`, `keys`, `len`) when invoked. The `Arc` pointer is the
/// subscriber's identity: registering the same `Arc` twice on one channel
/// keeps a single registration, while two separate `Arc`s wrapping equal
/// closures are two distinct subscribers.
pub type Subscriber = Arc<dyn Fn() + Send + Sync + 'static>;

/// Identity of a registered subscriber, derived from its `Arc` pointer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

impl SubscriberId {
    pub(crate) fn of(subscriber: &Subscriber) -> Self {
        SubscriberId(Arc::as_ptr(subscriber) as *const () as usize)
    }
}

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriberId({:#x})", self.0)
    }
}

/// The three store-global notification channels.
///
/// Per-item subscriptions are keyed separately and are not represented
/// here; see [`ObservableMap::subscribe_item`](crate::ObservableMap::subscribe_item).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Fires when the entry count changes (insert/remove).
    Size,
    /// Fires when the unfiltered key set changes.
    Keys,
    /// Fires on any mutation that could affect a filter predicate
    /// (conservatively, every item or map mutation).
    FilteredKeys,
}

/// Disposer for one registration.
///
/// `unsubscribe` is idempotent and outlives the store (it becomes a no-op
/// once the registries are gone). Dropping the handle does *not*
/// unsubscribe; fire-and-forget registrations stay live.
pub struct SubscriptionHandle {
    cancel: Box<dyn Fn() + Send + Sync>,
    active: AtomicBool,
}

impl SubscriptionHandle {
    pub(crate) fn new(cancel: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Box::new(cancel),
            active: AtomicBool::new(true),
        }
    }

    /// Remove the registration from its registry.
    ///
    /// Does not retract an already-scheduled per-item batch that captured
    /// the callback before this call; such a batch delivers at most once
    /// more.
    pub fn unsubscribe(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            (self.cancel)();
        }
    }

    /// Whether `unsubscribe` has been called on this handle.
    pub fn is_cancelled(&self) -> bool {
        !self.active.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
