//! Axum router configuration for all endpoints

use axum::{
  routing::{get, post},
  Router,
};
use std::sync::Arc;

use crate::config::TriageConfig;
use crate::server::handlers::{agents, logs, status, tools};
use crate::tools::Toolbox;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
  pub toolbox: Arc<Toolbox>,
  pub config: Arc<TriageConfig>,
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
  Router::new()
    // Status and version endpoints
    .route("/status", get(status::status))
    .route("/version", get(status::version))
    // Journal endpoint
    .route("/logs", get(logs::get_logs))
    // Agent manifests
    .route("/agents", get(agents::list_agents))
    // Tool endpoints
    .route("/tools/call", post(tools::call_tool))
    .route("/tools/validate", post(tools::validate))
    .route("/tools/ingest", post(tools::ingest))
    .route("/tools/ingest_batch", post(tools::ingest_batch))
    .route("/tools/retrieve", post(tools::retrieve))
    .route("/tools/analyze", post(tools::analyze))
    .route("/tools/plan", post(tools::plan))
    .with_state(state)
}
