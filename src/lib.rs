//! # Observable Map
//!
//! A generic key-value store that lets consumers subscribe to fine-grained
//! slices of shared state and receive deferred, batched notifications
//! instead of re-evaluating on every mutation.
//!
//! ## Core Concepts
//!
//! - **Channels**: four independent subscription facets (one item, the
//!   entry count, the key list, the filtered key list)
//! - **Deferred delivery**: mutators only queue notifications; the owner
//!   drains the queue with `flush()` at the end of its synchronous turn
//! - **Fallback value**: reads of absent keys yield a configured default
//!   instead of a missing-value signal
//! - **Bindings**: a small capability trait (`subscribe` + `snapshot`)
//!   adapts the store to any reactive UI runtime
//!
//! ## Example
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use telltale::{Notify, ObservableMap, StoreOptions};
//!
//! let store = ObservableMap::with_options(StoreOptions {
//!     initial: HashMap::from([("x", 10)]),
//!     fallback: Some(-1),
//! });
//!
//! assert_eq!(store.get(&"x"), Some(10));
//! assert_eq!(store.get(&"y"), Some(-1));
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! let handle = store.subscribe_item("x", {
//!     let seen = Arc::clone(&seen);
//!     Arc::new(move || {
//!         seen.fetch_add(1, Ordering::SeqCst);
//!     })
//! });
//!
//! // Nothing is delivered inside the mutator call...
//! store.update(&"x", |v| v + 1, Notify::Deliver);
//! assert_eq!(seen.load(Ordering::SeqCst), 0);
//!
//! // ...only when the turn ends.
//! store.flush().unwrap();
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! assert_eq!(store.get(&"x"), Some(11));
//!
//! handle.unsubscribe();
//! ```

pub mod binding;
pub mod error;
mod scheduler;
pub mod store;
pub mod subscriptions;
pub mod typed;
pub mod types;

// Re-exports
pub use binding::{Binding, ItemBinding, KeyFilter, KeysBinding, SizeBinding};
pub use error::{Result, StoreError};
pub use store::ObservableMap;
pub use subscriptions::{Channel, Subscriber, SubscriptionHandle};
pub use typed::TypedKey;
pub use types::{Notify, StoreOptions};
