//! Shared library for the market services
//!
//! Domain models, wire records, the unified API error type, the cache key
//! namespace, and small utilities used by every service binary.

pub mod cache_key;
pub mod error;
pub mod models;
pub mod util;
pub mod wire;

pub use error::{ApiError, ApiResult};
