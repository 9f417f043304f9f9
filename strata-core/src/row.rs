//! Cached row and column types.
//!
//! A row is a map from column name to [`CachedColumn`]; each column carries
//! the logical write timestamp assigned by the writer of record, which the
//! merge engine uses for last-writer-wins conflict resolution.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Opaque row identifier, unique within the backing store.
pub type RowKey = String;

/// A full cached row snapshot, keyed by column name.
pub type CachedRow = HashMap<String, CachedColumn>;

/// Typed column payload.
///
/// Serializes untagged so rows travel as plain JSON scalars. Variant order
/// matters for deserialization: integers are tried before doubles so `5`
/// stays a `Bigint` and `5.5` becomes a `Double`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum ColumnValue {
    Boolean(bool),
    Bigint(i64),
    Double(f64),
    Text(String),
}

impl ColumnValue {
    /// The schema type this value inhabits.
    pub fn kind(&self) -> crate::schema::ColumnType {
        match self {
            ColumnValue::Boolean(_) => crate::schema::ColumnType::Boolean,
            ColumnValue::Bigint(_) => crate::schema::ColumnType::Bigint,
            ColumnValue::Double(_) => crate::schema::ColumnType::Double,
            ColumnValue::Text(_) => crate::schema::ColumnType::Text,
        }
    }
}

// Doubles compare and hash by bit pattern so the type is lawfully Eq + Hash.
impl PartialEq for ColumnValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ColumnValue::Boolean(a), ColumnValue::Boolean(b)) => a == b,
            (ColumnValue::Bigint(a), ColumnValue::Bigint(b)) => a == b,
            (ColumnValue::Double(a), ColumnValue::Double(b)) => a.to_bits() == b.to_bits(),
            (ColumnValue::Text(a), ColumnValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ColumnValue {}

impl Hash for ColumnValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ColumnValue::Boolean(b) => {
                0u8.hash(state);
                b.hash(state);
            }
            ColumnValue::Bigint(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            ColumnValue::Double(d) => {
                2u8.hash(state);
                d.to_bits().hash(state);
            }
            ColumnValue::Text(s) => {
                3u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Boolean(b) => write!(f, "{}", b),
            ColumnValue::Bigint(i) => write!(f, "{}", i),
            ColumnValue::Double(d) => write!(f, "{}", d),
            ColumnValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for ColumnValue {
    fn from(s: &str) -> Self {
        ColumnValue::Text(s.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(s: String) -> Self {
        ColumnValue::Text(s)
    }
}

impl From<i64> for ColumnValue {
    fn from(i: i64) -> Self {
        ColumnValue::Bigint(i)
    }
}

impl From<f64> for ColumnValue {
    fn from(d: f64) -> Self {
        ColumnValue::Double(d)
    }
}

impl From<bool> for ColumnValue {
    fn from(b: bool) -> Self {
        ColumnValue::Boolean(b)
    }
}

/// A single cached column: name, decoded value, and the logical write
/// timestamp (microseconds, store convention).
///
/// Equality and hashing are structural over all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CachedColumn {
    pub name: String,
    pub data: ColumnValue,
    pub timestamp: i64,
}

impl CachedColumn {
    pub fn new(name: impl Into<String>, data: impl Into<ColumnValue>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(value: &ColumnValue) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_column_value_equality() {
        assert_eq!(ColumnValue::from("yes"), ColumnValue::from("yes"));
        assert_ne!(ColumnValue::from("yes"), ColumnValue::from("no"));
        assert_ne!(ColumnValue::from(1i64), ColumnValue::from(1.0));
        assert_eq!(ColumnValue::from(1.5), ColumnValue::from(1.5));
    }

    #[test]
    fn test_double_nan_is_reflexive() {
        let nan = ColumnValue::Double(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_eq!(hash_of(&nan), hash_of(&nan.clone()));
    }

    #[test]
    fn test_cached_column_structural_equality() {
        let a = CachedColumn::new("cached", "yes", 42);
        let b = CachedColumn::new("cached", "yes", 42);
        let c = CachedColumn::new("cached", "yes", 43);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_column_value_serializes_untagged() {
        let json = serde_json::to_string(&ColumnValue::from("yes")).unwrap();
        assert_eq!(json, "\"yes\"");
        let json = serde_json::to_string(&ColumnValue::from(42i64)).unwrap();
        assert_eq!(json, "42");
        let json = serde_json::to_string(&ColumnValue::from(true)).unwrap();
        assert_eq!(json, "true");
    }

    #[test]
    fn test_column_value_deserializes_integers_as_bigint() {
        let value: ColumnValue = serde_json::from_str("5").unwrap();
        assert_eq!(value, ColumnValue::Bigint(5));
        let value: ColumnValue = serde_json::from_str("5.5").unwrap();
        assert_eq!(value, ColumnValue::Double(5.5));
    }

    #[test]
    fn test_cached_column_json_shape() {
        let col = CachedColumn::new("cached", "yes", 1234);
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "cached", "data": "yes", "timestamp": 1234})
        );
    }

    #[test]
    fn test_row_round_trips_through_json() {
        let mut row = CachedRow::new();
        row.insert("cached".to_string(), CachedColumn::new("cached", "yes", 7));
        row.insert("count".to_string(), CachedColumn::new("count", 3i64, 7));

        let json = serde_json::to_string(&row).unwrap();
        let back: CachedRow = serde_json::from_str(&json).unwrap();
        assert_eq!(row, back);
    }
}
