use std::sync::Arc;

use chrono::Duration;

use crate::db::Store;

/// Shared handler state: the store plus the few settings handlers read.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub session_ttl: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, session_ttl: Duration) -> Self {
        Self { store, session_ttl }
    }
}
