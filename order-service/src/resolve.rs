//! Existence resolvers
//!
//! Two independent read-through lookups: user existence backed by the
//! database, product existence backed by the remote catalog probe. Both
//! consult the cache first, fall back to the authoritative source on miss,
//! and populate the cache with the boolean result for the standard TTL.

use shared::cache_key::{self, CACHE_TTL_SECS};

use crate::cache::Cache;
use crate::catalog::CatalogClient;
use crate::error::OrderError;
use crate::store::Store;

/// Does this user exist? Cache hit parses the cached boolean; miss falls
/// back to a row count and caches the answer.
pub async fn user_exists(
    store: &dyn Store,
    cache: &dyn Cache,
    user_id: i64,
) -> Result<bool, OrderError> {
    let key = cache_key::user(user_id);
    if let Some(cached) = cache.get(&key).await
        && let Ok(exists) = cached.parse::<bool>()
    {
        return Ok(exists);
    }

    let exists = store.user_exists(user_id).await.map_err(OrderError::from_read)?;
    cache
        .set_with_expiry(&key, if exists { "true" } else { "false" }, CACHE_TTL_SECS)
        .await;
    Ok(exists)
}

/// Does this product exist? The fallback is a probe of the remote catalog
/// service. A confirmed non-200 is cached as "false"; a transport fault is
/// propagated as a dependency fault, never conflated with absence.
pub async fn product_exists(
    catalog: &dyn CatalogClient,
    cache: &dyn Cache,
    product_id: i64,
) -> Result<bool, OrderError> {
    let key = cache_key::product(product_id);
    if let Some(cached) = cache.get(&key).await
        && let Ok(exists) = cached.parse::<bool>()
    {
        return Ok(exists);
    }

    let exists = catalog.product_exists(product_id).await?;
    cache
        .set_with_expiry(&key, if exists { "true" } else { "false" }, CACHE_TTL_SECS)
        .await;
    Ok(exists)
}
