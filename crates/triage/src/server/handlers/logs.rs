//! Journal endpoint handler

use axum::{extract::Query, http::StatusCode, response::Json, Extension};
use serde::Deserialize;

use crate::server::middleware::RequestContext;
use crate::server::types::{ApiError, BaseResponse, Empty, LogsResponse};

/// Default number of entries returned when the caller does not ask for a
/// specific limit
const DEFAULT_LOG_LIMIT: usize = 100;

/// Query parameters for GET /logs
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
  /// Maximum entries to return, newest first
  pub limit: Option<usize>,
  /// Only entries at this level (verbose, debug, info, warn, error, success)
  pub level: Option<String>,
}

/// GET /logs - Entries from the shared journal
pub async fn get_logs(
  Query(params): Query<LogsQuery>,
  Extension(context): Extension<RequestContext>,
) -> Result<Json<BaseResponse<LogsResponse>>, (StatusCode, Json<BaseResponse<Empty>>)> {
  let level_filter = match params.level.as_deref() {
    Some(name) => match foghorn::LogLevel::parse(name) {
      Some(level) => Some(level),
      None => {
        context.log_warn(&format!("Rejected unknown log level: {name}"), "logs-api");
        let error = ApiError::new("invalid_level", &format!("Unknown log level: {name}"));
        return Err((
          StatusCode::BAD_REQUEST,
          Json(BaseResponse::error(vec![error], context.request_id)),
        ));
      }
    },
    None => None,
  };

  let limit = params.limit.unwrap_or(DEFAULT_LOG_LIMIT);
  let logs = context.journal.query(Some(limit), level_filter);

  context.log_info(&format!("Returned {} journal entries", logs.len()), "logs-api");
  Ok(Json(BaseResponse::success(LogsResponse { logs }, context.request_id)))
}
