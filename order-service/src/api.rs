//! HTTP surface of the order service
//!
//! `POST /order` and `GET /user/purchased/{id}` are handled locally;
//! everything under `/user` and `/product` falls through to the relay.

use axum::Router;
use axum::body::Bytes;
use axum::extract::{OriginalUri, Path, State};
use axum::http::{HeaderMap, Method, header::CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use shared::wire::FlatRequest;
use shared::{ApiError, ApiResult};
use tower_http::trace::TraceLayer;

use crate::orders::{self, OrderDeps};
use crate::purchases;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/order", post(place_order))
        .route("/user/purchased/{user_id}", get(user_purchases))
        .fallback(relay)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `POST /order` with `{command: "place order", user_id, product_id, quantity}`
async fn place_order(
    State(state): State<AppState>,
    axum::Json(body): axum::Json<Value>,
) -> ApiResult<Response> {
    let request = FlatRequest::from_value(body)?;
    if request.command().as_deref() != Some("place order") {
        return Err(ApiError::invalid("Invalid Request"));
    }

    let deps = OrderDeps {
        store: state.store.clone(),
        cache: state.cache.clone(),
        catalog: state.catalog.clone(),
    };
    let placed = orders::place_order(&deps, &request).await?;

    Ok(axum::Json(json!({
        "product_id": placed.product_id,
        "user_id": placed.user_id,
        "quantity": placed.quantity,
        "status": "Success",
    }))
    .into_response())
}

/// `GET /user/purchased/{user_id}` -> `{ "<product_id>": total, ... }`
async fn user_purchases(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Response> {
    let user_id: i64 = user_id
        .parse()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::invalid("Invalid User ID"))?;

    let purchases =
        purchases::purchases_for_user(state.store.as_ref(), state.cache.as_ref(), user_id).await?;
    Ok(axum::Json(purchases).into_response())
}

/// Everything else is either a pass-through path or invalid
async fn relay(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    if method != Method::GET && method != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(uri.path());
    let content_type = headers.get(CONTENT_TYPE).cloned();
    state
        .relay
        .forward(method, path_and_query, content_type, body)
        .await
}
