//! Read-through / write-through coordinator.
//!
//! The client-facing seam over cache and store. Reads are cache-aside: a
//! miss loads the authoritative row from the store, populates the cache and
//! refreshes the store's copy. Writes are write-through: store first, then
//! cache, unconditionally. There is no timestamp comparison here, in
//! deliberate asymmetry to the merge engine's gated behavior: an
//! authoritative client write supersedes whatever is cached.
//!
//! Every store write goes through [`StoreAdapter::write_row`], which batches
//! the suppression write/delete, so the mutation notifications triggered by
//! this component's own writes never re-enter the merge path.

use std::sync::Arc;

use strata_core::{CachedRow, StrataResult};

use crate::adapter::StoreAdapter;
use crate::cache::store::{CacheStats, CacheStore};

/// Coordinates whole-row operations across the cache and the store adapter.
pub struct CacheCoordinator<C> {
    cache: Arc<C>,
    store: Arc<dyn StoreAdapter>,
}

impl<C: CacheStore> CacheCoordinator<C> {
    pub fn new(cache: Arc<C>, store: Arc<dyn StoreAdapter>) -> Self {
        Self { cache, store }
    }

    /// Read a row: cache first, store on miss.
    ///
    /// A store hit populates the cache and writes the row back to the store
    /// so the store carries a fresh copy; the write-back is suppressed from
    /// the merge path. Returns `Ok(None)` when the row exists in neither
    /// tier, which the transport maps to 404. Store failures are fatal to
    /// the caller.
    pub async fn get(&self, key: &str) -> StrataResult<Option<Arc<CachedRow>>> {
        if let Some(row) = self.cache.get(key) {
            return Ok(Some(row));
        }

        let Some(row) = self.store.fetch_row(key).await? else {
            tracing::debug!(key, "row absent from cache and store");
            return Ok(None);
        };

        self.cache.put(key, row.clone());
        self.store.write_row(key, &row).await?;
        tracing::debug!(key, columns = row.len(), "populated cache from store");
        Ok(Some(Arc::new(row)))
    }

    /// Write a row through to store and cache.
    ///
    /// Store first: if the store write fails the cache is left untouched and
    /// the error propagates.
    pub async fn put(&self, key: &str, row: CachedRow) -> StrataResult<()> {
        self.store.write_row(key, &row).await?;
        self.cache.put(key, row);
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Clear all cached rows and zero the counters (deterministic test
    /// setup; not an operational primitive).
    pub fn reset_cache(&self) {
        self.cache.reset_cache();
    }

    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    pub fn store(&self) -> &Arc<dyn StoreAdapter> {
        &self.store
    }
}

impl<C> Clone for CacheCoordinator<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            store: Arc::clone(&self.store),
        }
    }
}
