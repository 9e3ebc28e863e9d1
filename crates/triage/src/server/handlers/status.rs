//! Status and version endpoint handlers

use axum::{extract::State, response::Json, Extension};

use crate::server::middleware::RequestContext;
use crate::server::routing::AppState;
use crate::server::types::{BaseResponse, StatusResponse, VersionResponse};
use crate::store::IncidentLog;

/// GET /status - Health check and configuration overview
pub async fn status(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
) -> Json<BaseResponse<StatusResponse>> {
  let record_count = IncidentLog::new(state.config.log_file.clone()).count().unwrap_or(0);

  let response = StatusResponse {
    service: "triage".to_string(),
    status: "healthy".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
    record_count,
    embedding_url: state.config.embedding_url.clone(),
    index_url: state.config.index_url.clone(),
    archive_configured: state.config.archive_url.is_some(),
  };

  context.log_info("Status requested", "status-api");
  Json(BaseResponse::success(response, context.request_id))
}

/// GET /version - Returns current crate version
pub async fn version(
  Extension(context): Extension<RequestContext>,
) -> Json<BaseResponse<VersionResponse>> {
  let response = VersionResponse { version: env!("CARGO_PKG_VERSION").to_string() };
  Json(BaseResponse::success(response, context.request_id))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clients::{MemoryVectorIndex, StaticEmbeddingService};
  use crate::config::TriageConfig;
  use crate::ingest::Ingestor;
  use crate::retrieve::Retriever;
  use crate::tools::Toolbox;
  use anyhow::Result;
  use axum::http::{Method, Uri};
  use foghorn::journal::Journal;
  use std::sync::Arc;
  use tempfile::TempDir;

  fn test_state(dir: &TempDir) -> AppState {
    let config = TriageConfig {
      log_file: dir.path().join("incidents.jsonl"),
      ..TriageConfig::default()
    };

    let log = IncidentLog::new(config.log_file.clone());
    let embeddings = Arc::new(StaticEmbeddingService::default());
    let index = Arc::new(MemoryVectorIndex::default());
    let toolbox = Toolbox::new(
      Ingestor::new(embeddings.clone(), index.clone(), None, log.clone()),
      Retriever::new(embeddings, index, log),
    );

    AppState { toolbox: Arc::new(toolbox), config: Arc::new(config) }
  }

  fn test_context() -> RequestContext {
    RequestContext::new(Method::GET, Uri::from_static("/status"), Arc::new(Journal::new(10)))
  }

  #[tokio::test]
  async fn status_reports_configuration() -> Result<()> {
    let dir = TempDir::new()?;
    let state = test_state(&dir);

    let Json(response) = status(State(state), Extension(test_context())).await;
    assert_eq!(response.data.service, "triage");
    assert_eq!(response.data.status, "healthy");
    assert_eq!(response.data.record_count, 0);
    assert!(!response.data.archive_configured);
    assert!(response.errors.is_empty());
    Ok(())
  }

  #[tokio::test]
  async fn version_reports_crate_version() {
    let Json(response) = version(Extension(test_context())).await;
    assert_eq!(response.data.version, env!("CARGO_PKG_VERSION"));
  }
}
