//! HTTP server setup and demo handlers.
//!
//! # Responsibilities
//! - Create the Axum router with the demo handlers
//! - Wire up the trace layer
//! - Serve until Ctrl+C

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures_util::future::join_all;
use rand::Rng;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, ProviderConfig};
use crate::error::BalancerError;
use crate::load_balancer::{BalancerStatus, LoadBalancer};
use crate::provider::{HealthCheckMode, Provider, RevivingProvider};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

/// Result of a demo run.
#[derive(Debug, Serialize)]
pub struct DemoSummary {
    pub dispatched: usize,
    pub elapsed_ms: u64,
    pub balancer: BalancerStatus,
}

/// Balancer errors surfaced as HTTP 500.
#[derive(Debug)]
pub struct ApiError(BalancerError);

impl From<BalancerError> for ApiError {
    fn from(e: BalancerError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Demo request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

/// Build the router serving the demo routes.
pub fn build_router(config: AppConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
    };

    Router::new()
        .route("/success", get(success_handler))
        .route("/with-retry", get(with_retry_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// HTTP server for the demo front end.
pub struct DemoServer {
    router: Router,
}

impl DemoServer {
    pub fn new(config: AppConfig) -> Self {
        Self {
            router: build_router(config),
        }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Register every configured provider and dispatch the demo workload concurrently.
async fn success_handler(State(state): State<AppState>) -> Result<Json<DemoSummary>, ApiError> {
    let config = &state.config;
    let balancer = Arc::new(LoadBalancer::new(config.balancer.clone())?);

    let providers = config
        .providers
        .iter()
        .map(ProviderConfig::build)
        .collect::<Result<Vec<_>, _>>()?;
    balancer.register(&providers)?;

    let started = Instant::now();
    let (min_ms, max_ms) = (config.demo.min_work_ms, config.demo.max_work_ms);
    let requests = (0..config.demo.requests).map(|_| {
        let balancer = Arc::clone(&balancer);
        let work_ms = rand::thread_rng().gen_range(min_ms..=max_ms);
        async move {
            balancer
                .dispatch(|_| async move {
                    tokio::time::sleep(Duration::from_millis(work_ms)).await;
                    Ok::<_, BalancerError>(())
                })
                .await
        }
    });

    for result in join_all(requests).await {
        result?;
    }
    tracing::info!(requests = config.demo.requests, "All requests processed");

    Ok(Json(DemoSummary {
        dispatched: config.demo.requests,
        elapsed_ms: started.elapsed().as_millis() as u64,
        balancer: balancer.status(),
    }))
}

/// Dispatch two units to a provider that is dead until the health checker
/// reinstates it.
async fn with_retry_handler(State(state): State<AppState>) -> Result<Json<DemoSummary>, ApiError> {
    let config = &state.config;
    let balancer = LoadBalancer::new(config.balancer.clone())?;

    let provider: Arc<dyn Provider> = Arc::new(RevivingProvider::new(
        "first",
        5,
        HealthCheckMode::Extended,
        Duration::from_millis(config.demo.revive_after_ms),
    )?);
    balancer.register(&[provider])?;

    let started = Instant::now();
    for _ in 0..2 {
        balancer
            .dispatch(|_| async { Ok::<_, BalancerError>(()) })
            .await?;
    }

    Ok(Json(DemoSummary {
        dispatched: 2,
        elapsed_ms: started.elapsed().as_millis() as u64,
        balancer: balancer.status(),
    }))
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
