//! API Configuration Module
//!
//! Configuration for the server binary, loaded from environment variables
//! with sensible defaults for development: bind address, CORS origins, and
//! the cached table's schema.

use strata_core::{ColumnType, TableSchema};

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for binding, CORS, and the cached table schema.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind the HTTP listener to.
    pub bind_host: String,

    /// Port to bind the HTTP listener to.
    pub bind_port: u16,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Name of the cached table.
    pub schema_table: String,

    /// Name of the key column (encodes the row's own key; not cacheable).
    pub schema_key_column: String,

    /// Cacheable columns as (name, type) pairs.
    pub schema_columns: Vec<(String, ColumnType)>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 9090,
            cors_origins: Vec::new(), // Empty = allow all
            schema_table: "data".to_string(),
            schema_key_column: "id".to_string(),
            schema_columns: vec![("cached".to_string(), ColumnType::Text)],
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `STRATA_API_BIND`: bind host (default: 0.0.0.0)
    /// - `PORT` / `STRATA_API_PORT`: bind port (default: 9090)
    /// - `STRATA_CORS_ORIGINS`: comma-separated allowed origins (empty = allow all)
    /// - `STRATA_TABLE`: cached table name (default: data)
    /// - `STRATA_KEY_COLUMN`: key column name (default: id)
    /// - `STRATA_COLUMNS`: comma-separated `name:type` pairs, types one of
    ///   text|bigint|double|boolean (default: cached:text)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_host = std::env::var("STRATA_API_BIND").unwrap_or(defaults.bind_host);

        let bind_port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("STRATA_API_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.bind_port);

        let cors_origins = std::env::var("STRATA_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let schema_table = std::env::var("STRATA_TABLE").unwrap_or(defaults.schema_table);
        let schema_key_column =
            std::env::var("STRATA_KEY_COLUMN").unwrap_or(defaults.schema_key_column);

        let schema_columns = std::env::var("STRATA_COLUMNS")
            .ok()
            .map(|s| parse_columns(&s))
            .unwrap_or(defaults.schema_columns);

        Self {
            bind_host,
            bind_port,
            cors_origins,
            schema_table,
            schema_key_column,
            schema_columns,
        }
    }

    /// Build the table schema described by this config.
    pub fn table_schema(&self) -> TableSchema {
        let mut schema = TableSchema::new(&self.schema_table, &self.schema_key_column);
        for (name, ty) in &self.schema_columns {
            schema = schema.with_column(name, *ty);
        }
        schema
    }

    /// Check if running with restricted CORS (production mode).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }
}

/// Parse `name:type` pairs; malformed entries are skipped with a warning so
/// a bad env var cannot keep the server from starting.
fn parse_columns(spec: &str) -> Vec<(String, ColumnType)> {
    spec.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let (name, ty) = entry.split_once(':')?;
            match ty.trim().parse::<ColumnType>() {
                Ok(ty) => Some((name.trim().to_string(), ty)),
                Err(e) => {
                    tracing::warn!(entry, error = %e, "skipping malformed column spec");
                    None
                }
            }
        })
        .collect()
}
