//! Tool server startup and configuration

use anyhow::Result;
use axum::serve;
use foghorn::journal::Journal;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::TriageConfig;
use crate::server::middleware::{init_global_journal, request_context_middleware};
use crate::server::routing::{create_router, AppState};
use crate::tools::Toolbox;

/// Entries the server journal retains
const JOURNAL_CAPACITY: usize = 1000;

/// Start the tool server
pub async fn start_server(config: TriageConfig, addr: SocketAddr) -> Result<()> {
  let journal = Arc::new(Journal::new(JOURNAL_CAPACITY));
  if init_global_journal(journal.clone()).is_err() {
    foghorn::warn!("Journal already initialized; reusing the existing instance");
  }

  journal.info(&format!("Starting triage tool server on {addr}"), "triage-server");
  foghorn::info!(&format!("Starting triage tool server on {addr}"));

  let toolbox = Toolbox::from_config(&config)?;
  let state = AppState { toolbox: Arc::new(toolbox), config: Arc::new(config) };

  // TODO: replace the permissive CORS policy once deployments move beyond
  // localhost tooling
  let app = create_router(state)
    .layer(axum::middleware::from_fn(request_context_middleware))
    .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()));

  let listener = TcpListener::bind(addr).await?;
  journal.info(&format!("Server listening on {addr}"), "triage-server");
  foghorn::info!(&format!("Server listening on {addr}"));

  match serve(listener, app).await {
    Ok(_) => {
      journal.info("Server shutdown gracefully", "triage-server");
      Ok(())
    }
    Err(e) => {
      journal.error(&format!("Server error: {e}"), "triage-server");
      Err(anyhow::anyhow!("Server error: {e}"))
    }
  }
}
