//! Error types for Strata operations

use thiserror::Error;

use crate::schema::ColumnType;

/// Codec errors raised while translating between raw store bytes and typed
/// column values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Unknown column: {name}")]
    UnknownColumn { name: String },

    #[error("Decode failed for column {column} as {expected}: {reason}")]
    DecodeFailed {
        column: String,
        expected: ColumnType,
        reason: String,
    },

    #[error("Value for column {column} does not match declared type {expected}")]
    TypeMismatch { column: String, expected: ColumnType },
}

/// Store adapter errors. These are fatal to the coordinator's caller; no
/// retry or backoff happens at this tier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Read failed for key {key}: {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("Write failed for key {key}: {reason}")]
    WriteFailed { key: String, reason: String },
}

/// Master error type for all Strata errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StrataError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for Strata operations.
pub type StrataResult<T> = Result<T, StrataError>;

// =============================================================================
// TESTS
// =============================================================================
