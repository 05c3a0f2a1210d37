//! Order orchestrator
//!
//! The order path: validate the flat request, resolve user and product
//! existence, check stock, commit the atomic decrement+insert, then
//! invalidate the dependent cache entries. Rejections can happen at every
//! stage; only a fault strictly inside the commit is fatal.

use std::sync::Arc;

use serde::Serialize;
use shared::cache_key;
use shared::wire::FlatRequest;

use crate::cache::Cache;
use crate::catalog::CatalogClient;
use crate::error::OrderError;
use crate::store::{CommitOutcome, Store};
use crate::{resolve, stock};

/// The collaborators of the order path, injected so tests can substitute
/// in-memory fakes
#[derive(Clone)]
pub struct OrderDeps {
    pub store: Arc<dyn Store>,
    pub cache: Arc<dyn Cache>,
    pub catalog: Arc<dyn CatalogClient>,
}

/// A successfully committed order, echoed to the caller
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlacedOrder {
    pub product_id: i64,
    pub user_id: i64,
    pub quantity: i64,
    #[serde(skip)]
    pub order_id: i64,
}

pub async fn place_order(
    deps: &OrderDeps,
    request: &FlatRequest,
) -> Result<PlacedOrder, OrderError> {
    // Validating: all three fields present, numeric, positive
    let user_id = request.id_field("user_id").map_err(|_| OrderError::Validation)?;
    let product_id = request.id_field("product_id").map_err(|_| OrderError::Validation)?;
    let quantity = request.qty_field("quantity").map_err(|_| OrderError::Validation)?;

    // ResolvingIdentities
    if !resolve::user_exists(deps.store.as_ref(), deps.cache.as_ref(), user_id).await? {
        return Err(OrderError::NotFound("User"));
    }
    if !resolve::product_exists(deps.catalog.as_ref(), deps.cache.as_ref(), product_id).await? {
        return Err(OrderError::NotFound("Product"));
    }

    // CheckingStock: point-in-time, possibly from a stale cached count.
    // The commit below re-checks atomically.
    if !stock::has_stock(deps.store.as_ref(), deps.cache.as_ref(), product_id, quantity).await? {
        return Err(OrderError::InsufficientStock);
    }

    // Committing: decrement and insert as one transaction
    let outcome = deps
        .store
        .commit_order(product_id, user_id, quantity)
        .await
        .map_err(OrderError::from_commit)?;

    let order_id = match outcome {
        CommitOutcome::Placed { order_id } => order_id,
        // Stock vanished between the check and the commit
        CommitOutcome::OutOfStock => return Err(OrderError::InsufficientStock),
    };

    // InvalidatingCache: the order is already durable; failures here are
    // logged inside the cache layer and never roll it back
    deps.cache.delete(&cache_key::product_stock(product_id)).await;
    deps.cache.delete(&cache_key::user_purchases(user_id)).await;

    tracing::info!(order_id, product_id, user_id, quantity, "order placed");

    Ok(PlacedOrder { product_id, user_id, quantity, order_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NullCache;
    use crate::testutil::{FaultyCatalog, MemoryCache, MemoryStore, StaticCatalog};
    use serde_json::json;

    fn deps(store: MemoryStore, cache: impl Cache + 'static, catalog_exists: bool) -> OrderDeps {
        OrderDeps {
            store: Arc::new(store),
            cache: Arc::new(cache),
            catalog: Arc::new(StaticCatalog(catalog_exists)),
        }
    }

    fn order(user_id: i64, product_id: i64, quantity: i64) -> FlatRequest {
        FlatRequest::from_value(json!({
            "command": "place order",
            "user_id": user_id,
            "product_id": product_id,
            "quantity": quantity,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn happy_path_decrements_and_records() {
        let store = MemoryStore::new().with_user(42).with_product(7, 5);
        let d = deps(store, MemoryCache::new(), true);

        let placed = place_order(&d, &order(42, 7, 3)).await.unwrap();
        assert_eq!(placed.product_id, 7);
        assert_eq!(placed.user_id, 42);
        assert_eq!(placed.quantity, 3);

        let store = d.store.clone();
        assert_eq!(store.stock_of(7).await.unwrap(), Some(2));
        let purchases = store.purchases_by_user(42).await.unwrap();
        assert_eq!(purchases.get(&7), Some(&3));
    }

    #[tokio::test]
    async fn malformed_requests_reject_before_any_lookup() {
        let d = deps(MemoryStore::new(), MemoryCache::new(), true);

        for body in [
            json!({"command": "place order"}),
            json!({"command": "place order", "user_id": 1, "product_id": 2}),
            json!({"command": "place order", "user_id": "x", "product_id": 2, "quantity": 1}),
            json!({"command": "place order", "user_id": -1, "product_id": 2, "quantity": 1}),
            json!({"command": "place order", "user_id": 1, "product_id": 2, "quantity": 0}),
        ] {
            let req = FlatRequest::from_value(body).unwrap();
            assert!(matches!(
                place_order(&d, &req).await,
                Err(OrderError::Validation)
            ));
        }
    }

    #[tokio::test]
    async fn unknown_user_leaves_everything_unchanged() {
        let store = MemoryStore::new().with_product(7, 5);
        let d = deps(store, MemoryCache::new(), true);

        let result = place_order(&d, &order(9999, 7, 1)).await;
        assert!(matches!(result, Err(OrderError::NotFound("User"))));
        assert_eq!(d.store.stock_of(7).await.unwrap(), Some(5));
        assert!(d.store.purchases_by_user(9999).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let store = MemoryStore::new().with_user(42);
        let d = deps(store, MemoryCache::new(), false);

        let result = place_order(&d, &order(42, 7, 1)).await;
        assert!(matches!(result, Err(OrderError::NotFound("Product"))));
    }

    #[tokio::test]
    async fn catalog_outage_fails_the_request_as_retryable() {
        let store = MemoryStore::new().with_user(42).with_product(7, 5);
        let d = OrderDeps {
            store: Arc::new(store),
            cache: Arc::new(NullCache),
            catalog: Arc::new(FaultyCatalog),
        };

        let result = place_order(&d, &order(42, 7, 1)).await;
        assert!(matches!(result, Err(OrderError::Dependency(_))));
        // Nothing was committed
        assert_eq!(d.store.stock_of(7).await.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn insufficient_stock_rejects_without_writes() {
        let store = MemoryStore::new().with_user(42).with_product(7, 2);
        let d = deps(store, MemoryCache::new(), true);

        let result = place_order(&d, &order(42, 7, 3)).await;
        assert!(matches!(result, Err(OrderError::InsufficientStock)));
        assert_eq!(d.store.stock_of(7).await.unwrap(), Some(2));
        assert!(d.store.purchases_by_user(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_cache_passes_guard_but_commit_rejects() {
        // The cached stock count says 10, the store says 1: the guard
        // passes, the atomic commit catches it, and no row is written.
        let store = MemoryStore::new().with_user(42).with_product(7, 1);
        let cache = MemoryCache::new();
        cache.set_with_expiry("product:stock:7", "10", 60).await;
        let d = deps(store, cache, true);

        let result = place_order(&d, &order(42, 7, 5)).await;
        assert!(matches!(result, Err(OrderError::InsufficientStock)));
        assert_eq!(d.store.stock_of(7).await.unwrap(), Some(1));
        assert!(d.store.purchases_by_user(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn commit_invalidates_dependent_cache_entries() {
        let store = MemoryStore::new().with_user(42).with_product(7, 5);
        let cache = MemoryCache::new();
        cache.set_with_expiry("product:stock:7", "5", 60).await;
        cache.set_with_expiry("user:purchases:42", "{\"9\":1}", 60).await;
        let d = deps(store, cache, true);

        place_order(&d, &order(42, 7, 3)).await.unwrap();

        // A subsequent stock read must not see a value above the true
        // post-commit stock
        assert_eq!(d.cache.get("product:stock:7").await, None);
        assert_eq!(d.cache.get("user:purchases:42").await, None);
        assert!(
            stock::has_stock(d.store.as_ref(), d.cache.as_ref(), 7, 2).await.unwrap()
        );
        assert!(
            !stock::has_stock(d.store.as_ref(), d.cache.as_ref(), 7, 3).await.unwrap()
        );
    }

    #[tokio::test]
    async fn concurrent_orders_never_oversell() {
        // Product 7 has stock 5; two concurrent orders each want 3.
        // Exactly one commits, final stock is 2, never -1.
        let store = MemoryStore::new().with_user(1).with_user(2).with_product(7, 5);
        let d = deps(store, MemoryCache::new(), true);

        let d1 = d.clone();
        let d2 = d.clone();
        let (a, b) = tokio::join!(
            tokio::spawn(async move { place_order(&d1, &order(1, 7, 3)).await }),
            tokio::spawn(async move { place_order(&d2, &order(2, 7, 3)).await }),
        );
        let results = [a.unwrap(), b.unwrap()];

        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(OrderError::InsufficientStock)))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);
        assert_eq!(d.store.stock_of(7).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn many_concurrent_orders_bounded_by_stock() {
        let mut store = MemoryStore::new().with_product(3, 10);
        for user in 1..=8 {
            store = store.with_user(user);
        }
        let d = deps(store, MemoryCache::new(), true);

        let mut handles = Vec::new();
        for user in 1..=8 {
            let d = d.clone();
            handles.push(tokio::spawn(async move {
                place_order(&d, &order(user, 3, 2)).await
            }));
        }

        let mut committed = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                committed += 2;
            }
        }
        // 8 requests of 2 against stock 10: five commit, three reject
        assert_eq!(committed, 10);
        assert_eq!(d.store.stock_of(3).await.unwrap(), Some(0));
    }
}
