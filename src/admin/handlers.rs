use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::observability::StatsSnapshot;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FirewallStats {
    pub requests: StatsSnapshot,
    pub tracked_clients: usize,
    pub rules_loaded: usize,
    pub entity_detection: bool,
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn get_stats(State(state): State<AppState>) -> Json<FirewallStats> {
    let pipeline = &state.pipeline;
    let rules = pipeline.filter().rules();
    Json(FirewallStats {
        requests: pipeline.stats().snapshot(),
        tracked_clients: pipeline.limiter().tracked_clients(),
        rules_loaded: rules.len(),
        entity_detection: rules.entity_detector().is_some(),
    })
}
