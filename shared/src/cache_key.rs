//! Cache key namespace
//!
//! Keys are namespaced by entity kind and id. A cache entry is a hint, never
//! authoritative: the database is always the source of truth, and every
//! write path that changes an underlying fact must update or delete the
//! matching key in the same logical operation.

/// The only supported TTL. One minute everywhere.
pub const CACHE_TTL_SECS: u64 = 60;

/// `user:<id>` — cached boolean, user existence
pub fn user(id: i64) -> String {
    format!("user:{id}")
}

/// `product:<id>` — cached boolean, product existence
pub fn product(id: i64) -> String {
    format!("product:{id}")
}

/// `product:stock:<id>` — cached integer, stock count
pub fn product_stock(id: i64) -> String {
    format!("product:stock:{id}")
}

/// `user:purchases:<id>` — cached JSON aggregate, purchases by user
pub fn user_purchases(id: i64) -> String {
    format!("user:purchases:{id}")
}
