//! Tracing bootstrap for the server binary.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Honors `RUST_LOG` when set; otherwise defaults to info-level output for
/// the strata crates and the HTTP trace layer.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("strata=info,strata_api=info,strata_storage=info,tower_http=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
