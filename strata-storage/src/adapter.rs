//! Store adapter traits.
//!
//! The backing column store is an external collaborator; this module pins
//! down the two seams the cache needs from it. Any store that can fetch and
//! write full rows and report committed mutations can sit behind
//! [`StoreAdapter`], which keeps the merge engine and coordinator decoupled
//! from any particular store's plugin mechanism and makes the adapter
//! substitutable in tests.

use std::sync::Arc;

use async_trait::async_trait;
use strata_core::{CachedRow, RowMutation, StrataResult};

/// Callback invoked by a store adapter once per committed row mutation.
///
/// The call is synchronous from the store's perspective: it must not
/// observably block, and implementations must catch and swallow their own
/// errors so a listener failure can never fail the triggering write.
pub trait MutationListener: Send + Sync {
    fn on_mutation(&self, mutation: &RowMutation);
}

/// Row-level access to the backing column store.
///
/// Connectivity and timeout failures propagate to the caller as
/// [`strata_core::StoreError`]; no retry or backoff happens at this tier.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Fetch the authoritative full row, or `None` if the store has no
    /// columns for the key. The suppression column is never surfaced.
    async fn fetch_row(&self, key: &str) -> StrataResult<Option<CachedRow>>;

    /// Durably write all supplied columns.
    ///
    /// As part of the same logical mutation the adapter writes then deletes
    /// the suppression column, so the notification batch the store emits for
    /// this write always signals merge suppression.
    async fn write_row(&self, key: &str, row: &CachedRow) -> StrataResult<()>;

    /// Connectivity check for readiness probes.
    async fn ping(&self) -> StrataResult<()>;

    /// Register a listener to be invoked on every committed row mutation.
    fn register_listener(&self, listener: Arc<dyn MutationListener>);
}
