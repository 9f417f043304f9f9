//! Test utilities, generators, and fixtures for Strata.
//!
//! Used from the integration tests of downstream crates; nothing here ships
//! in a production binary.

use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;
use strata_core::{
    CachedColumn, CachedRow, ColumnType, ColumnValue, StoreError, StrataResult, TableSchema,
};
use strata_storage::{MutationListener, StoreAdapter};

// ============================================================================
// FIXTURES
// ============================================================================

/// Schema used throughout the tests: one column of every supported type.
pub fn demo_schema() -> TableSchema {
    TableSchema::new("data", "id")
        .with_column("cached", ColumnType::Text)
        .with_column("count", ColumnType::Bigint)
        .with_column("score", ColumnType::Double)
        .with_column("active", ColumnType::Boolean)
}

/// Build a row from columns, keyed by each column's name.
pub fn row_of(columns: impl IntoIterator<Item = CachedColumn>) -> CachedRow {
    columns
        .into_iter()
        .map(|column| (column.name.clone(), column))
        .collect()
}

/// Single-text-column row, the shape most scenarios use.
pub fn text_row(name: &str, value: &str, timestamp: i64) -> CachedRow {
    row_of([CachedColumn::new(name, value, timestamp)])
}

// ============================================================================
// STORE ADAPTER DOUBLES
// ============================================================================

/// Store adapter that fails every operation, for exercising the
/// store-failure paths end to end.
pub struct FailingStoreAdapter;

#[async_trait]
impl StoreAdapter for FailingStoreAdapter {
    async fn fetch_row(&self, key: &str) -> StrataResult<Option<CachedRow>> {
        Err(StoreError::ReadFailed {
            key: key.to_string(),
            reason: "store is down".to_string(),
        }
        .into())
    }

    async fn write_row(&self, key: &str, _row: &CachedRow) -> StrataResult<()> {
        Err(StoreError::WriteFailed {
            key: key.to_string(),
            reason: "store is down".to_string(),
        }
        .into())
    }

    async fn ping(&self) -> StrataResult<()> {
        Err(StoreError::Unavailable {
            reason: "store is down".to_string(),
        }
        .into())
    }

    fn register_listener(&self, _listener: Arc<dyn MutationListener>) {}
}

// ============================================================================
// GENERATORS
// ============================================================================

/// Any typed column value that survives a JSON round trip (doubles are kept
/// finite; JSON cannot carry NaN or infinities).
pub fn arb_column_value() -> impl Strategy<Value = ColumnValue> {
    prop_oneof![
        any::<bool>().prop_map(ColumnValue::Boolean),
        any::<i64>().prop_map(ColumnValue::Bigint),
        (-1.0e15f64..1.0e15).prop_map(ColumnValue::Double),
        "[a-z0-9 ]{0,24}".prop_map(ColumnValue::Text),
    ]
}

/// A non-empty row conforming to [`demo_schema`]: `cached` is always
/// present, the other columns each appear in half the cases.
pub fn arb_demo_row() -> impl Strategy<Value = CachedRow> {
    let ts = 0i64..1_000_000_000_000;
    (
        ("[a-z0-9 ]{0,24}", ts.clone()),
        proptest::option::of((any::<i64>(), ts.clone())),
        proptest::option::of(((-1.0e15f64..1.0e15), ts.clone())),
        proptest::option::of((any::<bool>(), ts)),
    )
        .prop_map(|(cached, count, score, active)| {
            let mut columns = vec![CachedColumn::new("cached", cached.0, cached.1)];
            if let Some((value, ts)) = count {
                columns.push(CachedColumn::new("count", value, ts));
            }
            if let Some((value, ts)) = score {
                columns.push(CachedColumn::new("score", value, ts));
            }
            if let Some((value, ts)) = active {
                columns.push(CachedColumn::new("active", value, ts));
            }
            row_of(columns)
        })
}
