//! Stock guard
//!
//! Answers "does product P have at least quantity Q in stock" from the
//! cached count when available, otherwise from the authoritative store.
//! This is a point-in-time check: it reserves nothing, and the count may
//! change before the commit. The guarded decrement in the store is what
//! actually enforces the limit.

use shared::cache_key::{self, CACHE_TTL_SECS};

use crate::cache::Cache;
use crate::error::OrderError;
use crate::store::Store;

pub async fn has_stock(
    store: &dyn Store,
    cache: &dyn Cache,
    product_id: i64,
    requested: i64,
) -> Result<bool, OrderError> {
    let key = cache_key::product_stock(product_id);
    if let Some(cached) = cache.get(&key).await
        && let Ok(stock) = cached.parse::<i64>()
    {
        return Ok(stock >= requested);
    }

    match store.stock_of(product_id).await.map_err(OrderError::from_read)? {
        Some(stock) => {
            cache
                .set_with_expiry(&key, &stock.to_string(), CACHE_TTL_SECS)
                .await;
            Ok(stock >= requested)
        }
        // Unknown product: no stock, nothing to cache
        None => Ok(false),
    }
}
