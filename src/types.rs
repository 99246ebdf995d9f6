//! Core types for the observable map.

use std::collections::HashMap;

/// Construction options for an [`ObservableMap`](crate::ObservableMap).
///
/// ```
/// use std::collections::HashMap;
/// use telltale::StoreOptions;
///
/// let options = StoreOptions {
///     initial: HashMap::from([("x", 10)]),
///     fallback: Some(-1),
/// };
/// ```
#[derive(Clone, Debug)]
pub struct StoreOptions<K, V> {
    /// Entries seeded into the store at construction.
    pub initial: HashMap<K, V>,

    /// Value returned for reads of absent keys instead of `None`.
    pub fallback: Option<V>,
}

impl<K, V> Default for StoreOptions<K, V> {
    fn default() -> Self {
        Self {
            initial: HashMap::new(),
            fallback: None,
        }
    }
}

/// Whether a mutator schedules subscriber notification.
///
/// Every write operation takes a trailing `Notify`. `Silent` suppresses the
/// entire notification pass for that call, letting batch-construction code
/// avoid a storm of deliveries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Notify {
    /// Schedule deliveries on the affected channels.
    #[default]
    Deliver,
    /// Mutate without scheduling anything.
    Silent,
}

impl Notify {
    pub(crate) fn deliver(self) -> bool {
        matches!(self, Notify::Deliver)
    }
}
