//! Read-only admin API, served on its own loopback listener.

pub mod handlers;

use axum::{routing::get, Router};
use tokio::net::TcpListener;

use self::handlers::*;
use crate::http::server::AppState;
use crate::lifecycle::Shutdown;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/stats", get(get_stats))
        .with_state(state)
}

/// Serve the admin router until `shutdown` fires.
pub async fn serve_admin(
    listener: TcpListener,
    state: AppState,
    shutdown: Shutdown,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(shutdown.signalled())
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
