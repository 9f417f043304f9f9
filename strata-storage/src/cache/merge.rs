//! Mutation-merge engine.
//!
//! Reconciles committed store mutations into already-cached rows. Merging
//! is timestamp-gated at column granularity (last-writer-wins); the merge
//! path never populates a row, only the coordinator's read-through does
//! that. A failure while merging is logged and swallowed so it can never
//! propagate back into the store's write path.

use std::sync::Arc;

use strata_core::{CachedColumn, CachedRow, CodecError, ColumnMutation, RowMutation, TableSchema};

use crate::adapter::MutationListener;
use crate::cache::store::CacheStore;

/// What the engine did with one mutation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The batch carried the suppression tombstone: it came from the
    /// coordinator's own write-through path and was discarded whole.
    Suppressed,
    /// The key is not cached; nothing to keep fresh.
    ColdRow,
    /// The row vanished between the presence check and lock acquisition.
    Evicted,
    /// A column failed to decode; the whole batch was dropped and the
    /// cached row left untouched.
    Dropped,
    /// The batch was merged under the key's lock.
    Merged {
        inserted: usize,
        updated: usize,
        skipped: usize,
    },
}

/// Merges mutation-notification batches into the cache.
///
/// Registered with the store adapter as a [`MutationListener`]; one engine
/// instance serves all keys.
pub struct MutationMergeEngine<C> {
    cache: Arc<C>,
    schema: Arc<TableSchema>,
}

impl<C: CacheStore> MutationMergeEngine<C> {
    pub fn new(cache: Arc<C>, schema: Arc<TableSchema>) -> Self {
        Self { cache, schema }
    }

    /// Apply one committed mutation batch.
    ///
    /// Never fails: decode errors drop the batch (the replacement row is
    /// built aside and only published on success) and are logged.
    pub fn apply(&self, mutation: &RowMutation) -> MergeOutcome {
        if mutation.suppresses_merge() {
            tracing::trace!(key = %mutation.key, "write-through batch, merge suppressed");
            return MergeOutcome::Suppressed;
        }

        // Only already-cached rows are kept fresh; read-through loads the
        // cold ones.
        if !self.cache.contains(&mutation.key) {
            tracing::trace!(key = %mutation.key, "row not cached, batch discarded");
            return MergeOutcome::ColdRow;
        }

        self.cache.with_write_lock(&mutation.key, |slot| {
            // Re-check under the lock: the row may have been evicted since
            // the presence check above.
            let Some(current) = slot.row() else {
                return MergeOutcome::Evicted;
            };

            let merged = merge_columns(&self.schema, current, &mutation.columns);
            match merged {
                Ok(merge) => {
                    let outcome = MergeOutcome::Merged {
                        inserted: merge.inserted,
                        updated: merge.updated,
                        skipped: merge.skipped,
                    };
                    if let Some(next) = merge.row {
                        slot.replace(next);
                    }
                    tracing::debug!(
                        key = %mutation.key,
                        inserted = merge.inserted,
                        updated = merge.updated,
                        skipped = merge.skipped,
                        "merged mutation batch"
                    );
                    outcome
                }
                Err(error) => {
                    tracing::error!(key = %mutation.key, %error, "dropping mutation batch");
                    MergeOutcome::Dropped
                }
            }
        })
    }
}

impl<C: CacheStore> MutationListener for MutationMergeEngine<C> {
    fn on_mutation(&self, mutation: &RowMutation) {
        // apply() swallows every failure internally; nothing may reach the
        // store's write path.
        self.apply(mutation);
    }
}

struct ColumnMerge {
    /// Replacement row to publish, or `None` when nothing changed.
    row: Option<CachedRow>,
    inserted: usize,
    updated: usize,
    skipped: usize,
}

fn merge_columns(
    schema: &TableSchema,
    current: &CachedRow,
    columns: &[ColumnMutation],
) -> Result<ColumnMerge, CodecError> {
    use std::collections::hash_map::Entry;

    let mut next = current.clone();
    let (mut inserted, mut updated, mut skipped) = (0, 0, 0);

    for col in columns {
        // The key column encodes the row's own key and unknown columns are
        // not cacheable attributes; neither participates in the merge.
        let Some(ty) = schema.column_type(&col.name) else {
            skipped += 1;
            continue;
        };

        if col.tombstone {
            // Last-writer-wins delete: only a strictly newer tombstone
            // removes the cached column.
            match next.get(&col.name) {
                Some(cached) if col.timestamp > cached.timestamp => {
                    next.remove(&col.name);
                    updated += 1;
                }
                _ => skipped += 1,
            }
            continue;
        }

        let data = ty.decode(&col.name, &col.value)?;
        match next.entry(col.name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(CachedColumn {
                    name: col.name.clone(),
                    data,
                    timestamp: col.timestamp,
                });
                inserted += 1;
            }
            Entry::Occupied(mut slot) => {
                let cached = slot.get_mut();
                if col.timestamp > cached.timestamp {
                    cached.data = data;
                    cached.timestamp = col.timestamp;
                    updated += 1;
                } else {
                    // Stale or duplicate mutation.
                    skipped += 1;
                }
            }
        }
    }

    let row = (inserted + updated > 0).then_some(next);
    Ok(ColumnMerge {
        row,
        inserted,
        updated,
        skipped,
    })
}
