//! Purchases-by-user view
//!
//! A read-mostly aggregate: product id -> total quantity purchased, summed
//! over the user's order rows. Cached per-user with the standard TTL and
//! invalidated whenever a new order is recorded for that user.

use std::collections::BTreeMap;

use shared::cache_key::{self, CACHE_TTL_SECS};

use crate::cache::Cache;
use crate::error::OrderError;
use crate::resolve;
use crate::store::Store;

/// Keys are stringified product ids, matching the wire shape
pub type Purchases = BTreeMap<String, i64>;

pub async fn purchases_for_user(
    store: &dyn Store,
    cache: &dyn Cache,
    user_id: i64,
) -> Result<Purchases, OrderError> {
    if !resolve::user_exists(store, cache, user_id).await? {
        return Err(OrderError::NotFound("User"));
    }

    let key = cache_key::user_purchases(user_id);
    if let Some(cached) = cache.get(&key).await
        && let Ok(purchases) = serde_json::from_str::<Purchases>(&cached)
    {
        return Ok(purchases);
    }

    let totals = store
        .purchases_by_user(user_id)
        .await
        .map_err(OrderError::from_read)?;
    let purchases: Purchases = totals
        .into_iter()
        .map(|(product_id, quantity)| (product_id.to_string(), quantity))
        .collect();

    if let Ok(encoded) = serde_json::to_string(&purchases) {
        cache.set_with_expiry(&key, &encoded, CACHE_TTL_SECS).await;
    }
    Ok(purchases)
}
