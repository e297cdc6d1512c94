//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, body limit, request ID)
//! - Bind server to listener
//! - Run the rate-limit sweeper alongside the server

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::FirewallConfig;
use crate::http::handlers;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::lifecycle::Shutdown;
use crate::pipeline::RequestPipeline;
use crate::security::limits::body_limit;
use crate::security::Sweeper;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RequestPipeline>,
    pub trust_forwarded_for: bool,
}

/// Public HTTP server for the firewall.
pub struct HttpServer {
    router: Router,
    pipeline: Arc<RequestPipeline>,
    sweep_interval: Duration,
}

impl HttpServer {
    pub fn new(config: &FirewallConfig, pipeline: Arc<RequestPipeline>) -> Self {
        let state = AppState {
            pipeline: pipeline.clone(),
            trust_forwarded_for: config.listener.trust_forwarded_for,
        };
        let router = build_router(config, state);
        Self {
            router,
            pipeline,
            sweep_interval: Duration::from_secs(config.rate_limit.sweep_interval_secs),
        }
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            rules = self.pipeline.filter().rules().len(),
            "HTTP server starting"
        );

        let sweeper = Sweeper::new(self.pipeline.limiter().clone(), self.sweep_interval);
        let sweeper_handle = tokio::spawn(sweeper.run(shutdown.subscribe()));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.signalled())
            .await?;

        if let Err(e) = sweeper_handle.await {
            tracing::warn!(error = %e, "Rate limit sweeper task failed");
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the public router with all middleware layers.
pub fn build_router(config: &FirewallConfig, state: AppState) -> Router {
    Router::new()
        .route("/infer", post(handlers::infer))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(body_limit(&config.security))
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
}
