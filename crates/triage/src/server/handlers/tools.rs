//! Tool invocation endpoints
//!
//! Tool-level failures stay in-band as result text, matching the tool
//! contract; these handlers never map them to HTTP errors. Malformed JSON
//! bodies are rejected by the Json extractor before the handler runs.

use axum::{extract::State, response::Json, Extension};

use crate::incident::IncidentRecord;
use crate::patterns::analyze_incident_patterns;
use crate::plan::suggest_resolution_steps;
use crate::server::middleware::RequestContext;
use crate::server::routing::AppState;
use crate::server::types::{BaseResponse, ToolResponse};
use crate::tools::{AnalyzeArgs, BatchIngestArgs, PlanArgs, RetrieveArgs, ToolCall};

/// POST /tools/call - Dispatch a tool call by name
pub async fn call_tool(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(call): Json<ToolCall>,
) -> Json<BaseResponse<ToolResponse>> {
  context.log_info(&format!("Tool call: {}", call.name), "tools-api");
  let result = state.toolbox.dispatch(&call).await;
  Json(BaseResponse::success(ToolResponse { result }, context.request_id))
}

/// POST /tools/validate - Check one record against the required format
pub async fn validate(
  Extension(context): Extension<RequestContext>,
  Json(record): Json<IncidentRecord>,
) -> Json<BaseResponse<ToolResponse>> {
  let result = record.validation_status();
  context.log_info(&format!("Validated {}: {result}", record.incident_id), "tools-api");
  Json(BaseResponse::success(ToolResponse { result }, context.request_id))
}

/// POST /tools/ingest - Store a single record
pub async fn ingest(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(record): Json<IncidentRecord>,
) -> Json<BaseResponse<ToolResponse>> {
  context.log_info(&format!("Ingesting {}", record.incident_id), "tools-api");
  let result = state.toolbox.ingestor().ingest_incident(&record).await;
  Json(BaseResponse::success(ToolResponse { result }, context.request_id))
}

/// POST /tools/ingest_batch - Store a list of records
pub async fn ingest_batch(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(args): Json<BatchIngestArgs>,
) -> Json<BaseResponse<ToolResponse>> {
  context.log_info(&format!("Batch ingesting {} records", args.incidents.len()), "tools-api");
  let result = state.toolbox.ingestor().batch_ingest(&args.incidents).await;
  Json(BaseResponse::success(ToolResponse { result }, context.request_id))
}

/// POST /tools/retrieve - Similarity search over stored incidents
pub async fn retrieve(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(args): Json<RetrieveArgs>,
) -> Json<BaseResponse<ToolResponse>> {
  context.log_info(&format!("Retrieval query ({} neighbors)", args.num_neighbors), "tools-api");
  let result = state.toolbox.retriever().retrieve_context(&args.query, args.num_neighbors).await;
  Json(BaseResponse::success(ToolResponse { result }, context.request_id))
}

/// POST /tools/analyze - Pattern analysis across similar incidents
pub async fn analyze(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(args): Json<AnalyzeArgs>,
) -> Json<BaseResponse<ToolResponse>> {
  context.log_info("Pattern analysis requested", "tools-api");
  let result = analyze_incident_patterns(
    state.toolbox.retriever(),
    &args.incident_description,
    &args.service_impact,
  )
  .await;
  Json(BaseResponse::success(ToolResponse { result }, context.request_id))
}

/// POST /tools/plan - Build a resolution plan from retrieved context
pub async fn plan(
  Extension(context): Extension<RequestContext>,
  Json(args): Json<PlanArgs>,
) -> Json<BaseResponse<ToolResponse>> {
  context.log_info("Resolution plan requested", "tools-api");
  let result = suggest_resolution_steps(&args.context_data, &args.incident_details);
  Json(BaseResponse::success(ToolResponse { result }, context.request_id))
}
