pub mod auth;
pub mod config;
pub mod db;
pub mod forms;
pub mod handlers;
pub mod matching;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

pub use state::AppState;

/// Used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,bidboard_server=debug,tower_http=info";

/// Installs the fmt subscriber honoring `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
