use std::sync::Arc;

use anyhow::{Context, Result};
use catalog::{
    Catalog, get_catalog, get_catalog_remote,
    marker::{MarkerType, categories_to_marker_types},
};
use tracing::info;

use super::{
    config::{Config, StoreKind},
    database::{RedisStore, init_redis},
    store::{CompletionStore, MemoryStore},
};

pub struct State {
    pub catalog: Catalog,
    pub marker_types: Vec<MarkerType>,
    pub config: Config,
    pub store: Arc<dyn CompletionStore>,
}

impl State {
    pub async fn new() -> Result<Arc<Self>> {
        let config = Config::load()?;

        let catalog = match &config.catalog_url {
            Some(url) => get_catalog_remote(url)
                .await
                .with_context(|| format!("Failed to fetch catalog from {url}"))?,
            None => get_catalog(&config.catalog_path)
                .with_context(|| format!("Failed to load catalog from {}", config.catalog_path))?,
        };

        info!(
            "Loaded catalog: {} groups, {} categories, {} locations",
            catalog.groups().len(),
            catalog.categories().len(),
            catalog.locations().len()
        );

        let store: Arc<dyn CompletionStore> = match config.store {
            StoreKind::Redis => {
                let connection = init_redis(&config.redis_url)
                    .await
                    .context("Failed to connect to Redis")?;
                Arc::new(RedisStore::new(connection))
            }
            StoreKind::Memory => {
                info!("Using in-memory store, completions will not survive a restart");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::with_store(config, catalog, store))
    }

    pub fn with_store(config: Config, catalog: Catalog, store: Arc<dyn CompletionStore>) -> Arc<Self> {
        let marker_types = categories_to_marker_types(catalog.categories(), catalog.groups());

        Arc::new(Self {
            catalog,
            marker_types,
            config,
            store,
        })
    }
}
