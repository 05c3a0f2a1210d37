//! HTTP surface of the catalog service
//!
//! `POST /product` carries a flat record with a `command` discriminator
//! (create / update / delete / decrease); `GET /product/{id}` is both the
//! client lookup and the existence probe consumed by the order service.

use axum::Router;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use shared::models::Product;
use shared::wire::FlatRequest;
use shared::{ApiError, ApiResult};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::db::{self, db_err};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/product", post(product_command))
        .route("/product/{id}", get(get_product))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_product(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let id: i64 = id
        .parse()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::invalid("Invalid Product ID"))?;

    match db::get_product(&state.pool, id).await.map_err(db_err)? {
        Some(product) => Ok(axum::Json(product).into_response()),
        None => Err(ApiError::not_found("Product")),
    }
}

async fn product_command(
    State(state): State<AppState>,
    axum::Json(body): axum::Json<Value>,
) -> ApiResult<Response> {
    let request = FlatRequest::from_value(body)?;
    match request.command().as_deref() {
        Some("create") => create(&state, &request).await,
        Some("update") => update(&state, &request).await,
        Some("delete") => delete(&state, &request).await,
        Some("decrease") => decrease(&state, &request).await,
        _ => Err(ApiError::invalid("Invalid Request")),
    }
}

/// Unit price: positive decimal, normalized to exactly two places
fn price_field(request: &FlatRequest, key: &str) -> ApiResult<Decimal> {
    let raw = request.str_field(key)?;
    let price: Decimal = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::invalid("Invalid Request"))?;
    if price <= Decimal::ZERO {
        return Err(ApiError::invalid("Invalid Request"));
    }
    let mut price = price.round_dp(2);
    price.rescale(2);
    Ok(price)
}

async fn create(state: &AppState, request: &FlatRequest) -> ApiResult<Response> {
    let id = request.id_field("id")?;
    let name = request.str_field("name")?;
    let description = request.str_field("description")?;
    let price = price_field(request, "price")?;
    let quantity = request.qty_field("quantity")?;

    if db::product_exists(&state.pool, id).await.map_err(db_err)? {
        return Err(ApiError::conflict("Product"));
    }

    let product = Product { id, name, description, price, quantity };
    db::insert_product(&state.pool, &product).await.map_err(db_err)?;
    tracing::info!(product_id = id, "product created");
    Ok(axum::Json(product).into_response())
}

/// Partial update: absent fields keep their current values
async fn update(state: &AppState, request: &FlatRequest) -> ApiResult<Response> {
    let id = request.id_field("id")?;

    let Some(current) = db::get_product(&state.pool, id).await.map_err(db_err)? else {
        return Err(ApiError::not_found("Product"));
    };

    let name = match request.contains("name") {
        true => request.str_field("name")?,
        false => current.name,
    };
    let description = match request.contains("description") {
        true => request.str_field("description")?,
        false => current.description,
    };
    let price = match request.contains("price") {
        true => price_field(request, "price")?,
        false => current.price,
    };
    let quantity = match request.contains("quantity") {
        true => request.qty_field("quantity")?,
        false => current.quantity,
    };

    let product = Product { id, name, description, price, quantity };
    if !db::update_product(&state.pool, &product).await.map_err(db_err)? {
        return Err(ApiError::not_found("Product"));
    }
    Ok(axum::Json(product).into_response())
}

/// Deletion requires the submitted fields to match the current row,
/// price within 0.01
fn delete_verified(current: &Product, name: &str, price: Decimal, quantity: i64) -> bool {
    let price_tolerance = Decimal::new(1, 2); // 0.01
    current.name == name
        && (current.price - price).abs() < price_tolerance
        && current.quantity == quantity
}

async fn delete(state: &AppState, request: &FlatRequest) -> ApiResult<Response> {
    let id = request.id_field("id")?;
    let name = request.str_field("name")?;
    let price = price_field(request, "price")?;
    let quantity = request.qty_field("quantity")?;

    let Some(current) = db::get_product(&state.pool, id).await.map_err(db_err)? else {
        return Err(ApiError::not_found("Product"));
    };

    if !delete_verified(&current, &name, price, quantity) {
        return Err(ApiError::Unauthorized);
    }

    if !db::delete_product(&state.pool, id).await.map_err(db_err)? {
        return Err(ApiError::not_found("Product"));
    }
    tracing::info!(product_id = id, "product deleted");
    Ok(axum::Json(json!({})).into_response())
}

/// Stock decrement for the order path: atomic conditional update
async fn decrease(state: &AppState, request: &FlatRequest) -> ApiResult<Response> {
    let id = request.id_field("id")?;
    let amount = request.qty_field("quantity")?;

    if db::decrease_quantity(&state.pool, id, amount).await.map_err(db_err)? {
        let product = db::get_product(&state.pool, id)
            .await
            .map_err(db_err)?
            .ok_or(ApiError::Internal)?;
        return Ok(axum::Json(product).into_response());
    }

    // Zero rows: distinguish a missing product from insufficient stock
    if db::product_exists(&state.pool, id).await.map_err(db_err)? {
        Err(ApiError::invalid("Exceeded quantity limit"))
    } else {
        Err(ApiError::not_found("Product"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn price_parsing_and_rounding() {
        let req = FlatRequest::from_value(json!({
            "a": "49.999",
            "b": "0",
            "c": "-1.50",
            "d": "free",
            "e": 20,
        }))
        .unwrap();
        assert_eq!(price_field(&req, "a").unwrap().to_string(), "50.00");
        assert!(price_field(&req, "b").is_err());
        assert!(price_field(&req, "c").is_err());
        assert!(price_field(&req, "d").is_err());
        // Whole-number input still comes out with two places
        assert_eq!(price_field(&req, "e").unwrap().to_string(), "20.00");
        assert!(price_field(&req, "missing").is_err());
    }

    #[test]
    fn delete_verification_requires_matching_fields() {
        let current = Product {
            id: 7,
            name: "mug".into(),
            description: "ceramic".into(),
            price: "9.99".parse().unwrap(),
            quantity: 3,
        };
        let price = |s: &str| s.parse::<Decimal>().unwrap();

        assert!(delete_verified(&current, "mug", price("9.99"), 3));
        // Tolerance is strictly under one cent
        assert!(delete_verified(&current, "mug", price("9.995"), 3));
        assert!(!delete_verified(&current, "mug", price("9.98"), 3));
        assert!(!delete_verified(&current, "cup", price("9.99"), 3));
        assert!(!delete_verified(&current, "mug", price("9.99"), 4));
    }
}
