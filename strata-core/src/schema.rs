//! Table schema and the byte-level column codec.
//!
//! The backing store hands the merge path raw byte payloads; the schema maps
//! each cacheable column to a [`ColumnType`] that knows how to decode those
//! bytes into a [`ColumnValue`] (and encode them back for store writes).
//! Mutations for the key column or for columns the schema does not know are
//! not cacheable attributes and are skipped by the merge engine.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::row::ColumnValue;

/// Wire type of a cacheable column.
///
/// Encodings follow the store convention: UTF-8 for text, 8-byte big-endian
/// for bigint and double, a single byte for boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Bigint,
    Double,
    Boolean,
}

impl ColumnType {
    /// Decode a raw store payload into a typed value.
    pub fn decode(&self, column: &str, raw: &[u8]) -> Result<ColumnValue, CodecError> {
        match self {
            ColumnType::Text => std::str::from_utf8(raw)
                .map(|s| ColumnValue::Text(s.to_string()))
                .map_err(|e| CodecError::DecodeFailed {
                    column: column.to_string(),
                    expected: *self,
                    reason: e.to_string(),
                }),
            ColumnType::Bigint => fixed_bytes(column, *self, raw).map(|b| ColumnValue::Bigint(i64::from_be_bytes(b))),
            ColumnType::Double => fixed_bytes(column, *self, raw).map(|b| ColumnValue::Double(f64::from_be_bytes(b))),
            ColumnType::Boolean => match raw {
                [b] => Ok(ColumnValue::Boolean(*b != 0)),
                _ => Err(CodecError::DecodeFailed {
                    column: column.to_string(),
                    expected: *self,
                    reason: format!("expected 1 byte, got {}", raw.len()),
                }),
            },
        }
    }

    /// Encode a typed value into the raw store payload.
    ///
    /// Fails when the value does not inhabit this column type.
    pub fn encode(&self, column: &str, value: &ColumnValue) -> Result<Vec<u8>, CodecError> {
        match (self, value) {
            (ColumnType::Text, ColumnValue::Text(s)) => Ok(s.as_bytes().to_vec()),
            (ColumnType::Bigint, ColumnValue::Bigint(i)) => Ok(i.to_be_bytes().to_vec()),
            (ColumnType::Double, ColumnValue::Double(d)) => Ok(d.to_be_bytes().to_vec()),
            (ColumnType::Boolean, ColumnValue::Boolean(b)) => Ok(vec![u8::from(*b)]),
            _ => Err(CodecError::TypeMismatch {
                column: column.to_string(),
                expected: *self,
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Bigint => "bigint",
            ColumnType::Double => "double",
            ColumnType::Boolean => "boolean",
        }
    }
}

fn fixed_bytes(column: &str, expected: ColumnType, raw: &[u8]) -> Result<[u8; 8], CodecError> {
    raw.try_into().map_err(|_| CodecError::DecodeFailed {
        column: column.to_string(),
        expected,
        reason: format!("expected 8 bytes, got {}", raw.len()),
    })
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = ColumnTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ColumnType::Text),
            "bigint" => Ok(ColumnType::Bigint),
            "double" => Ok(ColumnType::Double),
            "boolean" => Ok(ColumnType::Boolean),
            _ => Err(ColumnTypeParseError(s.to_string())),
        }
    }
}

/// Error when parsing an invalid column type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTypeParseError(pub String);

impl fmt::Display for ColumnTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid column type: {}", self.0)
    }
}

impl std::error::Error for ColumnTypeParseError {}

/// Schema for one cached table: its name, the key column, and the typed
/// cacheable columns.
///
/// The key column encodes the row's own key rather than a real attribute,
/// so it is never cacheable. Columns absent from the schema are unknown to
/// the cache and likewise skipped by the merge engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    table: String,
    key_column: String,
    columns: HashMap<String, ColumnType>,
}

impl TableSchema {
    pub fn new(table: impl Into<String>, key_column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key_column: key_column.into(),
            columns: HashMap::new(),
        }
    }

    /// Add a cacheable column (builder style).
    pub fn with_column(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
        self.columns.insert(name.into(), ty);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn is_key_column(&self, name: &str) -> bool {
        self.key_column == name
    }

    /// Type of a cacheable column, or `None` for the key column and columns
    /// the schema does not know.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        if self.is_key_column(name) {
            return None;
        }
        self.columns.get(name).copied()
    }

    pub fn decode_column(&self, name: &str, raw: &[u8]) -> Result<ColumnValue, CodecError> {
        let ty = self
            .column_type(name)
            .ok_or_else(|| CodecError::UnknownColumn {
                name: name.to_string(),
            })?;
        ty.decode(name, raw)
    }

    pub fn encode_column(&self, name: &str, value: &ColumnValue) -> Result<Vec<u8>, CodecError> {
        let ty = self
            .column_type(name)
            .ok_or_else(|| CodecError::UnknownColumn {
                name: name.to_string(),
            })?;
        ty.encode(name, value)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}
