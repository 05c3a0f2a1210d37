//! order-service — order placement and stock consistency
//!
//! Long-running service that:
//! - Places orders: existence checks, stock guard, atomic decrement+insert
//! - Serves the per-user purchases aggregate
//! - Relays `/user` and `/product` requests to the owning services
//! - Keeps the TTL cache coherent with the database on every commit

mod api;
mod cache;
mod catalog;
mod config;
mod error;
mod orders;
mod purchases;
mod relay;
mod resolve;
mod state;
mod stock;
mod store;
#[cfg(test)]
mod testutil;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "order_service=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting order-service on port {}", config.port);

    let state = AppState::new(&config).await?;
    let app = api::router(state.clone());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("order-service listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.shutdown().await;
    tracing::info!("order-service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {e}");
    }
}
