//! HTTP surface of the identity service
//!
//! `POST /user` carries a flat record with a `command` discriminator
//! (create / update / delete); `GET /user/{id}` returns the stored record.
//! The password field is always the stored hash, never plaintext.

use axum::Router;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use shared::models::User;
use shared::util::hash_password;
use shared::wire::{FlatRequest, is_integer};
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
        .route("/user", post(user_command))
        .route("/user/{id}", get(get_user))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let id: i64 = id
        .parse()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::invalid("Invalid User ID"))?;

    match db::get_user(&state.pool, id).await.map_err(db_err)? {
        Some(user) => Ok(axum::Json(user).into_response()),
        None => Err(ApiError::not_found("User")),
    }
}

async fn user_command(
    State(state): State<AppState>,
    axum::Json(body): axum::Json<Value>,
) -> ApiResult<Response> {
    let request = FlatRequest::from_value(body)?;
    match request.command().as_deref() {
        Some("create") => create(&state, &request).await,
        Some("update") => update(&state, &request).await,
        Some("delete") => delete(&state, &request).await,
        _ => Err(ApiError::invalid("Invalid Request")),
    }
}

/// Username/email/password must be non-empty and not bare numbers
fn profile_field(request: &FlatRequest, key: &str) -> ApiResult<String> {
    let value = request.str_field(key)?;
    if is_integer(&value) {
        return Err(ApiError::invalid("Invalid Request"));
    }
    Ok(value)
}

async fn create(state: &AppState, request: &FlatRequest) -> ApiResult<Response> {
    let id = request.id_field("id")?;
    let username = profile_field(request, "username")?;
    let email = profile_field(request, "email")?;
    let password = profile_field(request, "password")?;

    if db::user_exists(&state.pool, id).await.map_err(db_err)? {
        return Err(ApiError::conflict("User"));
    }

    let user = User { id, username, email, password: hash_password(&password) };
    db::insert_user(&state.pool, &user).await.map_err(db_err)?;
    tracing::info!(user_id = id, "user created");
    Ok(axum::Json(user).into_response())
}

/// Partial update: absent fields keep their current values
async fn update(state: &AppState, request: &FlatRequest) -> ApiResult<Response> {
    let id = request.id_field("id")?;

    let Some(current) = db::get_user(&state.pool, id).await.map_err(db_err)? else {
        return Err(ApiError::not_found("User"));
    };

    let username = match request.contains("username") {
        true => profile_field(request, "username")?,
        false => current.username,
    };
    let email = match request.contains("email") {
        true => profile_field(request, "email")?,
        false => current.email,
    };
    let password = match request.contains("password") {
        true => hash_password(&profile_field(request, "password")?),
        false => current.password,
    };

    let user = User { id, username, email, password };
    if !db::update_user(&state.pool, &user).await.map_err(db_err)? {
        return Err(ApiError::not_found("User"));
    }
    Ok(axum::Json(user).into_response())
}

/// Deletion requires the full record to match, password compared by hash
fn delete_verified(current: &User, username: &str, email: &str, password: &str) -> bool {
    current.username == username
        && current.email == email
        && current.password == hash_password(password)
}

async fn delete(state: &AppState, request: &FlatRequest) -> ApiResult<Response> {
    let id = request.id_field("id")?;
    let username = request.str_field("username")?;
    let email = request.str_field("email")?;
    let password = request.str_field("password")?;

    let Some(current) = db::get_user(&state.pool, id).await.map_err(db_err)? else {
        return Err(ApiError::not_found("User"));
    };

    if !delete_verified(&current, &username, &email, &password) {
        return Err(ApiError::Unauthorized);
    }

    if !db::delete_user(&state.pool, id).await.map_err(db_err)? {
        return Err(ApiError::not_found("User"));
    }
    tracing::info!(user_id = id, "user deleted");
    Ok(axum::Json(json!({})).into_response())
}
