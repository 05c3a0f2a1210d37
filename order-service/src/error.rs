//! Order-placement error taxonomy
//!
//! `OrderError` separates terminal rejections (validation, not-found,
//! insufficient stock) from infrastructure faults. Dependency faults are
//! retryable by the caller: no partial state is observable until the commit
//! transaction completes. Persistence faults happen strictly inside the
//! decrement+insert transaction, which commits or rolls back as a unit.

use axum::response::IntoResponse;
use shared::ApiError;
use thiserror::Error;

use crate::catalog::ProbeError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum OrderError {
    /// Malformed or out-of-range input. Local, immediate, never retried.
    #[error("Invalid Request")]
    Validation,

    /// Referenced user or product does not exist. Terminal.
    #[error("{0} Not Found")]
    NotFound(&'static str),

    /// Insufficient stock, either at the guard check or at commit time.
    /// Terminal: a retry would simply race again.
    #[error("Exceeded quantity limit")]
    InsufficientStock,

    /// Store, cache or remote-service call failed transiently. Retryable.
    #[error("dependency fault: {0}")]
    Dependency(String),

    /// Failure inside the decrement+insert transaction. Fatal for the
    /// request; the transaction is never left half-applied.
    #[error("persistence fault: {0}")]
    Persistence(String),
}

impl OrderError {
    /// A store fault on a read path: retryable dependency fault.
    pub fn from_read(err: StoreError) -> Self {
        Self::Dependency(err.to_string())
    }

    /// A store fault on the commit path. A failed pool acquire means the
    /// transaction never started and the request is safely retryable;
    /// anything later is a persistence fault.
    pub fn from_commit(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(_) => Self::Dependency(err.to_string()),
            StoreError::Query(_) => Self::Persistence(err.to_string()),
        }
    }
}

impl From<ProbeError> for OrderError {
    fn from(err: ProbeError) -> Self {
        Self::Dependency(err.to_string())
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation => ApiError::invalid("Invalid Request"),
            OrderError::NotFound(resource) => ApiError::not_found(resource),
            OrderError::InsufficientStock => ApiError::invalid("Exceeded quantity limit"),
            OrderError::Dependency(msg) => ApiError::dependency(msg),
            OrderError::Persistence(msg) => {
                tracing::error!(error = %msg, "order commit failed");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> axum::response::Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn terminal_outcomes_map_to_client_errors() {
        assert_eq!(ApiError::from(OrderError::Validation).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(OrderError::NotFound("User")).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(OrderError::InsufficientStock).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn faults_map_to_500_without_detail() {
        let api = ApiError::from(OrderError::Dependency("pool timed out".into()));
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message(), "Internal Server Error");
    }

    #[test]
    fn commit_pool_timeout_is_retryable() {
        let err = OrderError::from_commit(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
        assert!(matches!(err, OrderError::Dependency(_)));
    }
}
