//! Service wiring: picks the catalog store and builds the services on top.

use std::sync::Arc;

use thiserror::Error;

use kinoteka_infra::{
    AdminService, CatalogService, CatalogStore, ConfigError, InMemoryCatalogStore,
    PostgresCatalogStore, Settings, StoreError,
};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub admin: AdminService,
    /// Prefix for image URLs in responses.
    pub media_url: String,
}

impl AppServices {
    pub fn new(store: Arc<dyn CatalogStore>, media_url: impl Into<String>) -> Self {
        Self {
            catalog: CatalogService::new(store.clone()),
            admin: AdminService::new(store),
            media_url: media_url.into(),
        }
    }
}

pub async fn build_services(settings: &Settings) -> Result<AppServices, StartupError> {
    let store: Arc<dyn CatalogStore> = match (&settings.database_url, settings.use_persistent_stores) {
        (Some(url), true) => {
            let store = PostgresCatalogStore::connect(url, settings.database_max_connections).await?;
            store.migrate().await?;
            tracing::info!(
                max_connections = settings.database_max_connections,
                "using postgres catalog store"
            );
            Arc::new(store)
        }
        (None, true) => return Err(ConfigError::Missing("DATABASE_URL").into()),
        (_, false) => {
            tracing::info!("using in-memory catalog store");
            Arc::new(InMemoryCatalogStore::new())
        }
    };

    Ok(AppServices::new(store, settings.media_url.clone()))
}
