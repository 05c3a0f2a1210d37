//! gateway — inter-service routing
//!
//! Routes inbound requests by path prefix to the identity or catalog
//! service and relays the response verbatim. No business logic.

mod proxy;

use axum::Router;
use proxy::Proxy;
use tower_http::trace::TraceLayer;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
struct Config {
    port: u16,
    user_service_url: String,
    product_service_url: String,
}

impl Config {
    fn from_env() -> Self {
        Self {
            port: std::env::var("GATEWAY_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(14003),
            user_service_url: std::env::var("USER_SERVICE_URL")
                .unwrap_or_else(|_| "http://user-service:14001".into()),
            product_service_url: std::env::var("PRODUCT_SERVICE_URL")
                .unwrap_or_else(|_| "http://product-service:14002".into()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gateway=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Starting gateway on port {}", config.port);

    let proxy = Proxy {
        client: reqwest::Client::new(),
        user_base: config.user_service_url,
        product_base: config.product_service_url,
    };

    let app = Router::new()
        .fallback(proxy::forward)
        .layer(TraceLayer::new_for_http())
        .with_state(proxy);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
