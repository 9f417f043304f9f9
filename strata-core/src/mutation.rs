//! Mutation-notification events.
//!
//! The store adapter delivers one [`RowMutation`] per committed row
//! mutation: the row key plus the column-level changes of that commit. The
//! batch carries raw store bytes; decoding is deferred to the merge engine
//! so a malformed payload can never fail the store's write path.

/// Reserved column name used to suppress re-entrant merges.
///
/// Every write-through performed by the coordinator writes this column and
/// deletes it within the same logical write, so the notification batch the
/// store emits for that write always contains a tombstone of this name. The
/// merge engine discards such batches whole. The column is never surfaced
/// to clients.
pub const SUPPRESS_MERGE_COLUMN: &str = "##suppress-merge##";

/// One column-level change within a committed row mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMutation {
    pub name: String,
    /// True for a deletion; `value` is empty in that case.
    pub tombstone: bool,
    /// Raw store payload, decoded against the table schema at merge time.
    pub value: Vec<u8>,
    /// Logical write timestamp (microseconds, store convention).
    pub timestamp: i64,
}

impl ColumnMutation {
    pub fn write(name: impl Into<String>, value: Vec<u8>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            tombstone: false,
            value,
            timestamp,
        }
    }

    pub fn tombstone(name: impl Into<String>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            tombstone: true,
            value: Vec::new(),
            timestamp,
        }
    }
}

/// The batch of column mutations delivered for one committed row mutation.
///
/// Within a batch the only ordering contract is per-column last-writer-wins
/// by timestamp; iteration order is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMutation {
    pub key: String,
    pub columns: Vec<ColumnMutation>,
}

impl RowMutation {
    pub fn new(key: impl Into<String>, columns: Vec<ColumnMutation>) -> Self {
        Self {
            key: key.into(),
            columns,
        }
    }

    /// True when the batch contains a tombstone of the suppression column,
    /// i.e. it was produced by the coordinator's own write-through path.
    pub fn suppresses_merge(&self) -> bool {
        self.columns
            .iter()
            .any(|c| c.tombstone && c.name == SUPPRESS_MERGE_COLUMN)
    }
}
