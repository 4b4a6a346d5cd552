//! HTTP server for the rates API
//!
//! Provides:
//! - Plain-text rates (/rates, /rates/:currency)
//! - Prometheus metrics (/metrics)
//! - API docs (/swagger/*)

use super::handlers::{self, ApiState};
use super::metrics::{track_metrics, HttpMetrics};
use crate::error::{AppError, Result};
use axum::{middleware, routing::get, Router};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build the router with metrics and tracing layers
pub fn router(state: Arc<ApiState>) -> Router {
    let metrics: Arc<HttpMetrics> = state.metrics.clone();

    Router::new()
        .route("/rates", get(handlers::get_rates))
        .route("/rates/:currency", get(handlers::get_rate))
        .route("/metrics", get(handlers::get_metrics))
        .route("/health", get(handlers::health_check))
        .route("/swagger", get(handlers::swagger_index))
        .route("/swagger/*path", get(handlers::swagger))
        .with_state(state)
        .route_layer(middleware::from_fn_with_state(metrics, track_metrics))
        .layer(TraceLayer::new_for_http())
}

/// Rates API server bound to an address
pub struct ApiServer {
    listener: TcpListener,
    router: Router,
    shutdown_timeout: Duration,
}

impl ApiServer {
    pub async fn bind(addr: &str, state: Arc<ApiState>, shutdown_timeout: Duration) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

        Ok(Self {
            listener,
            router: router(state),
            shutdown_timeout,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `cancel` fires, then drain open connections within the
    /// shutdown timeout
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let addr = self.local_addr()?;
        info!("Starting Currency Hub API server on {}", addr);

        let token = cancel.clone();
        let serve = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move {
                token.cancelled().await;
                info!("API server shutting down");
            })
            .into_future();
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => {
                if let Err(e) = &result {
                    error!("API server error: {}", e);
                }
                return result.map_err(AppError::from);
            }
            _ = cancel.cancelled() => {}
        }

        match tokio::time::timeout(self.shutdown_timeout, serve).await {
            Ok(result) => {
                info!("API server stopped");
                result.map_err(AppError::from)
            }
            Err(_) => Err(AppError::Shutdown(format!(
                "API server did not drain within {:?}",
                self.shutdown_timeout
            ))),
        }
    }
}
