//! Domain models shared across services

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A registered user. `password` always holds the hex SHA-256 digest of the
/// credential, never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A catalog product. `quantity` is the authoritative stock count; the order
/// path is the only mutator of it outside catalog admin operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Money on the wire is a plain JSON number, two-decimal precision
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: i64,
}

/// A committed order row. Append-only: the durable proof that a stock
/// decrement was committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}
