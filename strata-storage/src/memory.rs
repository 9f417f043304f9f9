//! Embedded in-memory column store.
//!
//! Standalone-mode and test implementation of [`StoreAdapter`]: rows are
//! raw encoded column bytes, every commit synchronously notifies the
//! registered mutation listeners, and [`InMemoryColumnStore::mutate`] is the
//! out-of-band writer path, the external-mutation case the merge engine
//! exists for. Columns reconcile per-column by timestamp with the newest
//! write winning, matching the backing store's own convention.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use dashmap::DashMap;
use strata_core::{
    CachedColumn, CachedRow, ColumnMutation, RowMutation, StrataResult, TableSchema,
    SUPPRESS_MERGE_COLUMN,
};

use crate::adapter::{MutationListener, StoreAdapter};

#[derive(Debug, Clone)]
struct StoredColumn {
    raw: Vec<u8>,
    timestamp: i64,
}

/// In-memory column store with synchronous mutation notifications.
pub struct InMemoryColumnStore {
    schema: Arc<TableSchema>,
    rows: DashMap<String, HashMap<String, StoredColumn>>,
    listeners: RwLock<Vec<Arc<dyn MutationListener>>>,
}

impl InMemoryColumnStore {
    pub fn new(schema: Arc<TableSchema>) -> Self {
        Self {
            schema,
            rows: DashMap::new(),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    /// Commit a mutation batch directly against the store, bypassing the
    /// coordinator (the out-of-band writer path). The committed batch is
    /// delivered to every registered listener without the suppression
    /// column, so cached rows for the key get merged.
    pub fn mutate(&self, key: &str, columns: Vec<ColumnMutation>) {
        self.commit(key, &columns);
        self.notify(&RowMutation::new(key, columns));
    }

    /// Number of rows currently stored.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn commit(&self, key: &str, columns: &[ColumnMutation]) {
        let mut row = self.rows.entry(key.to_string()).or_default();
        for col in columns {
            if col.name == SUPPRESS_MERGE_COLUMN {
                // write-then-delete control pair, never materialized
                continue;
            }
            let stale = row
                .get(&col.name)
                .is_some_and(|existing| existing.timestamp > col.timestamp);
            if stale {
                continue;
            }
            if col.tombstone {
                row.remove(&col.name);
            } else {
                row.insert(
                    col.name.clone(),
                    StoredColumn {
                        raw: col.value.clone(),
                        timestamp: col.timestamp,
                    },
                );
            }
        }
    }

    fn notify(&self, mutation: &RowMutation) {
        // Snapshot the listener list so callbacks run without the lock held.
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener.on_mutation(mutation);
        }
    }
}

#[async_trait]
impl StoreAdapter for InMemoryColumnStore {
    async fn fetch_row(&self, key: &str) -> StrataResult<Option<CachedRow>> {
        let Some(stored) = self.rows.get(key) else {
            return Ok(None);
        };
        let mut row = CachedRow::new();
        for (name, col) in stored.iter() {
            // Out-of-band writers may commit columns the schema does not
            // know; those are not cacheable attributes.
            let Some(ty) = self.schema.column_type(name) else {
                continue;
            };
            let data = ty.decode(name, &col.raw)?;
            row.insert(
                name.clone(),
                CachedColumn {
                    name: name.clone(),
                    data,
                    timestamp: col.timestamp,
                },
            );
        }
        Ok((!row.is_empty()).then_some(row))
    }

    async fn write_row(&self, key: &str, row: &CachedRow) -> StrataResult<()> {
        // Encode everything first so a codec failure leaves the row intact.
        let mut columns = Vec::with_capacity(row.len() + 2);
        for col in row.values() {
            let raw = self.schema.encode_column(&col.name, &col.data)?;
            columns.push(ColumnMutation::write(col.name.clone(), raw, col.timestamp));
        }

        // Suppression write/delete pair, part of the same logical write.
        let ts = row.values().map(|c| c.timestamp).max().unwrap_or_default();
        columns.push(ColumnMutation::write(SUPPRESS_MERGE_COLUMN, Vec::new(), ts));
        columns.push(ColumnMutation::tombstone(SUPPRESS_MERGE_COLUMN, ts));

        self.commit(key, &columns);
        self.notify(&RowMutation::new(key, columns));
        Ok(())
    }

    async fn ping(&self) -> StrataResult<()> {
        Ok(())
    }

    fn register_listener(&self, listener: Arc<dyn MutationListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use strata_core::{ColumnType, ColumnValue};

    struct RecordingListener {
        batches: Mutex<Vec<RowMutation>>,
    }

    impl RecordingListener {
        fn new() -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
            }
        }

        fn batches(&self) -> Vec<RowMutation> {
            self.batches.lock().unwrap().clone()
        }
    }

    impl MutationListener for RecordingListener {
        fn on_mutation(&self, mutation: &RowMutation) {
            self.batches.lock().unwrap().push(mutation.clone());
        }
    }

    fn schema() -> Arc<TableSchema> {
        Arc::new(
            TableSchema::new("data", "id")
                .with_column("cached", ColumnType::Text)
                .with_column("count", ColumnType::Bigint),
        )
    }

    fn row_with_text(name: &str, value: &str, ts: i64) -> CachedRow {
        let mut row = CachedRow::new();
        row.insert(name.to_string(), CachedColumn::new(name, value, ts));
        row
    }

    #[tokio::test]
    async fn test_write_row_round_trips() {
        let store = InMemoryColumnStore::new(schema());
        let row = row_with_text("cached", "yes", 100);

        store.write_row("123", &row).await.unwrap();
        let fetched = store.fetch_row("123").await.unwrap().unwrap();
        assert_eq!(fetched, row);
    }

    #[tokio::test]
    async fn test_fetch_missing_row_is_none() {
        let store = InMemoryColumnStore::new(schema());
        assert!(store.fetch_row("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_row_notification_signals_suppression() {
        let store = InMemoryColumnStore::new(schema());
        let listener = Arc::new(RecordingListener::new());
        store.register_listener(listener.clone());

        store
            .write_row("123", &row_with_text("cached", "yes", 100))
            .await
            .unwrap();

        let batches = listener.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].key, "123");
        assert!(batches[0].suppresses_merge());
    }

    #[tokio::test]
    async fn test_mutate_notification_does_not_signal_suppression() {
        let store = InMemoryColumnStore::new(schema());
        let listener = Arc::new(RecordingListener::new());
        store.register_listener(listener.clone());

        store.mutate(
            "123",
            vec![ColumnMutation::write("cached", b"no".to_vec(), 200)],
        );

        let batches = listener.batches();
        assert_eq!(batches.len(), 1);
        assert!(!batches[0].suppresses_merge());
    }

    #[tokio::test]
    async fn test_sentinel_never_materialized() {
        let store = InMemoryColumnStore::new(schema());
        store
            .write_row("123", &row_with_text("cached", "yes", 100))
            .await
            .unwrap();

        let fetched = store.fetch_row("123").await.unwrap().unwrap();
        assert!(!fetched.contains_key(SUPPRESS_MERGE_COLUMN));
    }

    #[tokio::test]
    async fn test_commit_reconciles_by_timestamp() {
        let store = InMemoryColumnStore::new(schema());
        store.mutate(
            "123",
            vec![ColumnMutation::write("cached", b"new".to_vec(), 200)],
        );
        // Older write must not clobber the newer value.
        store.mutate(
            "123",
            vec![ColumnMutation::write("cached", b"old".to_vec(), 100)],
        );

        let fetched = store.fetch_row("123").await.unwrap().unwrap();
        assert_eq!(fetched["cached"].data, ColumnValue::from("new"));
        assert_eq!(fetched["cached"].timestamp, 200);
    }

    #[tokio::test]
    async fn test_tombstone_removes_column() {
        let store = InMemoryColumnStore::new(schema());
        store.mutate(
            "123",
            vec![
                ColumnMutation::write("cached", b"yes".to_vec(), 100),
                ColumnMutation::write("count", 1i64.to_be_bytes().to_vec(), 100),
            ],
        );
        store.mutate("123", vec![ColumnMutation::tombstone("count", 200)]);

        let fetched = store.fetch_row("123").await.unwrap().unwrap();
        assert!(fetched.contains_key("cached"));
        assert!(!fetched.contains_key("count"));
    }

    #[tokio::test]
    async fn test_write_row_rejects_unknown_column() {
        let store = InMemoryColumnStore::new(schema());
        let row = row_with_text("mystery", "x", 100);
        assert!(store.write_row("123", &row).await.is_err());
        // Encode-first: nothing was committed.
        assert!(store.fetch_row("123").await.unwrap().is_none());
    }
}
