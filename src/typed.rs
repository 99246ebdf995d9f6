//! Typed accessors over the uniform value type.
//!
//! One store holds a single value type `V`, usually an enum when the key
//! universe mixes shapes. A [`TypedKey`] names one key of that universe
//! together with the concrete type stored under it, and the `*_typed`
//! operations pack and unpack through it so call sites read and write the
//! concrete type directly. A failed unpack (a different variant is stored
//! under the key) reads as absent and leaves updates untouched.

use std::hash::Hash;

use crate::store::ObservableMap;
use crate::types::Notify;

/// One key of the store's universe paired with its concrete value type.
///
/// ```
/// use telltale::{Notify, ObservableMap, TypedKey};
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum Setting {
///     Flag(bool),
///     Count(u32),
/// }
///
/// struct NavOpen;
///
/// impl TypedKey<&'static str, Setting> for NavOpen {
///     type Value = bool;
///
///     fn key(&self) -> &'static str {
///         "nav_open"
///     }
///
///     fn pack(value: bool) -> Setting {
///         Setting::Flag(value)
///     }
///
///     fn unpack(value: Setting) -> Option<bool> {
///         match value {
///             Setting::Flag(flag) => Some(flag),
///             _ => None,
///         }
///     }
/// }
///
/// let store: ObservableMap<&str, Setting> = ObservableMap::new();
/// store.set_typed(&NavOpen, true, Notify::Silent);
/// assert_eq!(store.get_typed(&NavOpen), Some(true));
/// ```
pub trait TypedKey<K, V> {
    type Value;

    fn key(&self) -> K;

    fn pack(value: Self::Value) -> V;

    fn unpack(value: V) -> Option<Self::Value>;
}

impl<K, V> ObservableMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Read the concrete value under a typed key. `None` when the key is
    /// absent (and no fallback unpacks) or another variant is stored.
    pub fn get_typed<T>(&self, slot: &T) -> Option<T::Value>
    where
        T: TypedKey<K, V>,
    {
        self.get(&slot.key()).and_then(T::unpack)
    }

    /// Write the concrete value under a typed key. Same notification
    /// behavior as [`set`](Self::set).
    pub fn set_typed<T>(&self, slot: &T, value: T::Value, notify: Notify)
    where
        T: TypedKey<K, V>,
    {
        self.set(slot.key(), T::pack(value), notify);
    }

    /// Transform the concrete value under a typed key. No-op (returning
    /// `false`) when the key is absent; a stored value of another variant
    /// is left as it is.
    pub fn update_typed<T, F>(&self, slot: &T, transform: F, notify: Notify) -> bool
    where
        T: TypedKey<K, V>,
        F: FnOnce(T::Value) -> T::Value,
    {
        self.update(
            &slot.key(),
            |current| match T::unpack(current.clone()) {
                Some(value) => T::pack(transform(value)),
                None => current,
            },
            notify,
        )
    }
}
