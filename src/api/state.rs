use crate::core::AppConfig;
use crate::schedule::SqliteStore;

pub struct AppState {
    pub store: SqliteStore,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: SqliteStore, config: AppConfig) -> Self {
        Self { store, config }
    }
}
