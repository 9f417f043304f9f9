//! Strata Core - Row Cache Data Model
//!
//! Pure data types shared by every other crate: the row/column model, the
//! table schema and its byte-level codec, mutation-notification events, and
//! the error enums. No business logic lives here; the coherence rules are
//! in `strata-storage`.

pub mod error;
pub mod mutation;
pub mod row;
pub mod schema;

pub use error::{CodecError, StoreError, StrataError, StrataResult};
pub use mutation::{ColumnMutation, RowMutation, SUPPRESS_MERGE_COLUMN};
pub use row::{CachedColumn, CachedRow, ColumnValue, RowKey};
pub use schema::{ColumnType, ColumnTypeParseError, TableSchema};
