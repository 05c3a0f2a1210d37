//! Durable store adapter
//!
//! Typed read/update operations against PostgreSQL, behind the `Store`
//! trait so the orchestrator can be exercised against an in-memory fake.
//! The database is the source of truth for users, products and orders;
//! every cache entry in front of it is a hint.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not obtain a pooled connection within the acquire timeout.
    /// Surfaces as a retryable fault instead of hanging the worker.
    #[error("store unavailable: {0}")]
    Unavailable(sqlx::Error),

    /// Query execution failed
    #[error("store query failed: {0}")]
    Query(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => Self::Unavailable(err),
            _ => Self::Query(err),
        }
    }
}

/// Result of the atomic decrement+insert transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Both effects committed; the generated order id
    Placed { order_id: i64 },
    /// The guarded decrement matched zero rows: stock vanished between the
    /// point-in-time check and the commit. Nothing was written.
    OutOfStock,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Whether a user row with this id exists
    async fn user_exists(&self, user_id: i64) -> Result<bool, StoreError>;

    /// Authoritative stock count, or `None` for an unknown product
    async fn stock_of(&self, product_id: i64) -> Result<Option<i64>, StoreError>;

    /// The single atomicity point of the order path: decrement stock only
    /// if the pre-decrement quantity covers the request, and insert the
    /// order row, in one transaction. Once started it runs to commit or
    /// rollback as a unit.
    async fn commit_order(
        &self,
        product_id: i64,
        user_id: i64,
        quantity: i64,
    ) -> Result<CommitOutcome, StoreError>;

    /// product id -> total quantity purchased, summed over order rows
    async fn purchases_by_user(&self, user_id: i64) -> Result<BTreeMap<i64, i64>, StoreError>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn user_exists(&self, user_id: i64) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn stock_of(&self, product_id: i64) -> Result<Option<i64>, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT quantity FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(quantity,)| quantity))
    }

    async fn commit_order(
        &self,
        product_id: i64,
        user_id: i64,
        quantity: i64,
    ) -> Result<CommitOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Guarded decrement: the stock check and the subtraction are one
        // statement, so a concurrent commit can never drive the count
        // negative. Zero affected rows means the stock is gone.
        let updated = sqlx::query(
            "UPDATE products SET quantity = quantity - $2 WHERE id = $1 AND quantity >= $2",
        )
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls it back; nothing was written
            return Ok(CommitOutcome::OutOfStock);
        }

        let (order_id,): (i64,) = sqlx::query_as(
            "INSERT INTO orders (product_id, user_id, quantity) VALUES ($1, $2, $3) \
             RETURNING order_id",
        )
        .bind(product_id)
        .bind(user_id)
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(CommitOutcome::Placed { order_id })
    }

    async fn purchases_by_user(&self, user_id: i64) -> Result<BTreeMap<i64, i64>, StoreError> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT product_id, SUM(quantity)::bigint AS total_quantity \
             FROM orders WHERE user_id = $1 GROUP BY product_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }
}
