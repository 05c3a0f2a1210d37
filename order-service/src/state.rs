//! Application state for the order service

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::cache::{Cache, NullCache, RedisCache};
use crate::catalog::{CatalogClient, HttpCatalog};
use crate::config::Config;
use crate::relay::Relay;
use crate::store::{PgStore, Store};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state. All collaborators are constructed here and
/// injected through trait objects so tests can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL pool, kept for graceful shutdown
    pub pool: PgPool,
    pub store: Arc<dyn Store>,
    pub cache: Arc<dyn Cache>,
    pub catalog: Arc<dyn CatalogClient>,
    pub relay: Relay,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .connect(&config.database_url)
            .await?;

        // The services share one database; each owns a distinct slice of
        // the migration sequence, so versions applied by the peers are
        // expected
        let mut migrator = sqlx::migrate!("./migrations");
        migrator.set_ignore_missing(true);
        migrator.run(&pool).await?;

        // Fail-open at startup too: without a reachable cache backend the
        // service runs with the always-miss stub
        let cache: Arc<dyn Cache> = match RedisCache::connect(&config.redis_url).await {
            Ok(cache) => {
                tracing::info!("cache backend connected");
                Arc::new(cache)
            }
            Err(e) => {
                tracing::warn!(error = %e, "cache backend unavailable, running without cache");
                Arc::new(NullCache)
            }
        };

        let client = reqwest::Client::new();
        let catalog = HttpCatalog::new(client.clone(), config.product_service_url.clone());
        let relay = Relay::new(
            client,
            config.user_service_url.clone(),
            config.product_service_url.clone(),
        );

        Ok(Self {
            pool: pool.clone(),
            store: Arc::new(PgStore::new(pool)),
            cache,
            catalog: Arc::new(catalog),
            relay,
        })
    }

    /// Release pooled connections on graceful shutdown
    pub async fn shutdown(&self) {
        self.pool.close().await;
    }
}
