//! Error types for the observable map.

use thiserror::Error;

/// Main error type for store operations.
///
/// Reads, writes and subscriptions are total over their stated domain and
/// never fail; only the flush drivers can refuse misuse.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("flush called from inside a delivering callback")]
    ReentrantFlush,

    #[error("notification queue did not settle after {limit} flush passes")]
    UnsettledFlush { limit: usize },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
