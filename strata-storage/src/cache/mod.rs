//! Row cache with per-key locking and timestamp-gated merging.
//!
//! Two independently triggered call paths write the same keys: the
//! coordinator, invoked synchronously by client requests, and the merge
//! engine, invoked asynchronously by store mutation notifications. Both
//! serialize through the cache store's per-key exclusive lock; readers take
//! lock-free snapshots and rows are replaced whole, so a concurrent reader
//! observes either the pre- or post-update row, never a partially merged
//! one.

pub mod coordinator;
pub mod merge;
pub mod store;

pub use coordinator::CacheCoordinator;
pub use merge::{MergeOutcome, MutationMergeEngine};
pub use store::{CacheStats, CacheStore, RowSlot, ShardedRowCache};
