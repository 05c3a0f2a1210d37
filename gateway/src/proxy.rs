//! Prefix-routed pass-through proxy
//!
//! No retries, no caching, no transformation: the request method, content
//! type and body go upstream unchanged, and the upstream status and body
//! come back verbatim. An unreachable upstream is a gateway error, which a
//! caller can tell apart from an application error the upstream returned
//! itself.

use axum::body::{Body, Bytes};
use axum::extract::{OriginalUri, State};
use axum::http::{HeaderMap, Method, Response, StatusCode, header::CONTENT_TYPE};
use axum::response::IntoResponse;
use serde_json::json;

#[derive(Clone)]
pub struct Proxy {
    pub client: reqwest::Client,
    pub user_base: String,
    pub product_base: String,
}

impl Proxy {
    /// Upstream base URL by path prefix
    fn upstream_for(&self, path: &str) -> Option<&str> {
        if path == "/user" || path.starts_with("/user/") {
            Some(&self.user_base)
        } else if path == "/product" || path.starts_with("/product/") {
            Some(&self.product_base)
        } else {
            None
        }
    }
}

fn gateway_error() -> Response<Body> {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(json!({"status": "Gateway Error"})),
    )
        .into_response()
}

pub async fn forward(
    State(proxy): State<Proxy>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response<Body> {
    if method != Method::GET && method != Method::POST {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(uri.path());
    let path = path_and_query.split('?').next().unwrap_or(path_and_query);

    let Some(base) = proxy.upstream_for(path) else {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({"status": "Invalid Request"})),
        )
            .into_response();
    };

    let url = format!("{base}{path_and_query}");
    let mut request = proxy.client.request(method, &url).body(body);
    if let Some(ct) = headers.get(CONTENT_TYPE) {
        request = request.header(CONTENT_TYPE, ct);
    }

    let upstream = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(url = %url, error = %e, "upstream unreachable");
            return gateway_error();
        }
    };

    let status = upstream.status();
    let upstream_ct = upstream.headers().get(CONTENT_TYPE).cloned();
    let bytes = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(url = %url, error = %e, "upstream body read failed");
            return gateway_error();
        }
    };

    let mut builder = Response::builder().status(status);
    if let Some(ct) = upstream_ct {
        builder = builder.header(CONTENT_TYPE, ct);
    }
    builder
        .body(Body::from(bytes))
        .unwrap_or_else(|_| gateway_error())
}
