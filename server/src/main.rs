use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;

use bidboard_server::config::{Config, StoreBackend};
use bidboard_server::db::{MemoryStore, PgStore, Store};
use bidboard_server::models::US_STATES;
use bidboard_server::routes::create_routes;
use bidboard_server::{init_tracing, AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let config = Config::from_env().expect("Invalid configuration");

    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Postgres => Arc::new(
            PgStore::connect(&config.database_url, config.max_connections)
                .await
                .expect("Failed to prepare database"),
        ),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    store
        .seed_states(US_STATES)
        .await
        .expect("Failed to seed reference states");

    let state = AppState::new(store, config.session_ttl);
    let app: Router = create_routes(state, &config);

    let addr = config.bind_addr;
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
