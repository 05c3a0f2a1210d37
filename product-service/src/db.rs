//! Product table operations

use rust_decimal::Decimal;
use shared::ApiError;
use shared::models::Product;
use sqlx::PgPool;

pub fn db_err(err: sqlx::Error) -> ApiError {
    ApiError::dependency(format!("product store: {err}"))
}

pub async fn get_product(pool: &PgPool, id: i64) -> Result<Option<Product>, sqlx::Error> {
    let row: Option<(i64, String, String, Decimal, i64)> = sqlx::query_as(
        "SELECT id, name, description, price, quantity FROM products WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id, name, description, price, quantity)| Product {
        id,
        name,
        description,
        price,
        quantity,
    }))
}

pub async fn product_exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn insert_product(pool: &PgPool, product: &Product) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO products (id, name, description, price, quantity) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.quantity)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_product(pool: &PgPool, product: &Product) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE products SET name = $2, description = $3, price = $4, quantity = $5 \
         WHERE id = $1",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.quantity)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_product(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Guarded decrement: subtract only when the remaining quantity covers the
/// request. Zero affected rows means insufficient stock (or no such row).
pub async fn decrease_quantity(pool: &PgPool, id: i64, amount: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE products SET quantity = quantity - $2 WHERE id = $1 AND quantity >= $2",
    )
    .bind(id)
    .bind(amount)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
