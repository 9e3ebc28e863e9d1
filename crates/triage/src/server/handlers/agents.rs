//! Agent manifest endpoint handler

use axum::{response::Json, Extension};

use crate::agents;
use crate::server::middleware::RequestContext;
use crate::server::types::{AgentsResponse, BaseResponse};

/// GET /agents - Manifests for the external agent runtime
pub async fn list_agents(
  Extension(context): Extension<RequestContext>,
) -> Json<BaseResponse<AgentsResponse>> {
  let manifests = agents::registry();
  context.log_info(&format!("Served {} agent manifests", manifests.len()), "agents-api");
  Json(BaseResponse::success(AgentsResponse { agents: manifests }, context.request_id))
}
