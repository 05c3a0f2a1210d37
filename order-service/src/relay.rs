//! Pass-through relay
//!
//! `/user` and `/product` requests carry no order-service business logic;
//! they are forwarded to the owning service with method, content-type and
//! body preserved, and the upstream status and body are relayed verbatim.
//! An unreachable upstream surfaces as a gateway fault, distinct from any
//! application error the upstream itself returns.

use axum::body::{Body, Bytes};
use axum::http::{HeaderValue, Method, Response, header::CONTENT_TYPE};
use shared::ApiError;

#[derive(Clone)]
pub struct Relay {
    client: reqwest::Client,
    user_base: String,
    product_base: String,
}

impl Relay {
    pub fn new(
        client: reqwest::Client,
        user_base: impl Into<String>,
        product_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            user_base: user_base.into(),
            product_base: product_base.into(),
        }
    }

    /// Upstream base URL for a path, or `None` when the path is not ours
    /// to forward
    fn upstream_for(&self, path: &str) -> Option<&str> {
        if path == "/user" || path.starts_with("/user/") {
            Some(&self.user_base)
        } else if path == "/product" || path.starts_with("/product/") {
            Some(&self.product_base)
        } else {
            None
        }
    }

    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        content_type: Option<HeaderValue>,
        body: Bytes,
    ) -> Result<Response<Body>, ApiError> {
        let path = path_and_query.split('?').next().unwrap_or(path_and_query);
        let Some(base) = self.upstream_for(path) else {
            return Err(ApiError::invalid("Invalid Request"));
        };

        let url = format!("{base}{path_and_query}");
        let mut request = self.client.request(method, &url).body(body);
        if let Some(ct) = content_type {
            request = request.header(CONTENT_TYPE, ct);
        }

        let upstream = request
            .send()
            .await
            .map_err(|e| ApiError::dependency(format!("upstream unreachable: {url}: {e}")))?;

        let status = upstream.status();
        let upstream_ct = upstream.headers().get(CONTENT_TYPE).cloned();
        let bytes = upstream
            .bytes()
            .await
            .map_err(|e| ApiError::dependency(format!("upstream body read failed: {e}")))?;

        let mut builder = Response::builder().status(status);
        if let Some(ct) = upstream_ct {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        builder
            .body(Body::from(bytes))
            .map_err(|_| ApiError::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relay() -> Relay {
        Relay::new(
            reqwest::Client::new(),
            "http://user-service:14001",
            "http://product-service:14002",
        )
    }

    #[test]
    fn routes_by_prefix() {
        let r = relay();
        assert_eq!(r.upstream_for("/user"), Some("http://user-service:14001"));
        assert_eq!(r.upstream_for("/user/12"), Some("http://user-service:14001"));
        assert_eq!(r.upstream_for("/product/7"), Some("http://product-service:14002"));
        assert_eq!(r.upstream_for("/order"), None);
        assert_eq!(r.upstream_for("/username"), None);
    }
}
