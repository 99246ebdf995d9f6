//! Subscription system for live store updates.
//!
//! Four independent channels react to different facets of store change:
//! - per-item: the value under one key changed
//! - size: the entry count changed
//! - key-list: the unfiltered key set changed
//! - filtered-key-list: any mutation that could affect a filter predicate
//!
//! Subscribers are bare callbacks with no payload; on delivery they re-read
//! whatever live state they care about. Registration is set-like (the same
//! `Arc` subscribed twice is one member) and every subscribe returns an
//! idempotent [`SubscriptionHandle`] disposer.

pub(crate) mod registry;
mod types;

pub(crate) use registry::SubscriberRegistry;
pub(crate) use types::SubscriberId;
pub use types::{Channel, Subscriber, SubscriptionHandle};
