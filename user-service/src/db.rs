//! User table operations

use shared::ApiError;
use shared::models::User;
use sqlx::PgPool;

/// Map a database fault to the unified API error (details stay in logs)
pub fn db_err(err: sqlx::Error) -> ApiError {
    ApiError::dependency(format!("user store: {err}"))
}

pub async fn get_user(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    let row: Option<(i64, String, String, String)> =
        sqlx::query_as("SELECT id, username, email, password FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(id, username, email, password)| User { id, username, email, password }))
}

pub async fn user_exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn insert_user(pool: &PgPool, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO users (id, username, email, password) VALUES ($1, $2, $3, $4)")
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_user(pool: &PgPool, user: &User) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE users SET username = $2, email = $3, password = $4 WHERE id = $1")
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_user(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
