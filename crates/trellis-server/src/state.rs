use crate::config::AppConfig;
use std::sync::Arc;
use trellis_adapter_pg::PostgresStore;
use trellis_api::{Registry, Store};

/// Shared application state: the injected store and the resource registry.
pub struct AppState {
    pub cfg: AppConfig,
    pub store: Arc<dyn Store>,
    pub registry: Registry,
}

impl AppState {
    pub async fn init(cfg: &AppConfig) -> anyhow::Result<Self> {
        let store = PostgresStore::connect(&cfg.database.url).await?;
        Ok(Self::with_store(cfg.clone(), Arc::new(store)))
    }

    /// Build state around any store implementation; tests inject the
    /// scripted one here.
    pub fn with_store(cfg: AppConfig, store: Arc<dyn Store>) -> Self {
        let mut registry = Registry::new();
        trellis_resources::register_all(&mut registry);
        Self {
            cfg,
            store,
            registry,
        }
    }
}
