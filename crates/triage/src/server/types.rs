//! REST API types with schemars annotations

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agents::AgentManifest;

// Base Response Structure
// =======================

/// Base response object for all API endpoints
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BaseResponse<T> {
  /// Version of the service that produced this response
  pub api_version: String,

  /// Transaction ID for logging correlation
  pub transaction_id: Uuid,

  /// Error information, empty on success
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub errors: Vec<ApiError>,

  /// Response data (generic for different endpoint types)
  #[serde(flatten)]
  pub data: T,
}

/// API error information
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiError {
  /// Error key, unique to the error source
  pub key: String,

  /// Human readable error message
  pub message: String,

  /// Additional error context
  #[serde(default)]
  pub context: serde_json::Value,
}

/// Payload for responses that carry no data beyond the envelope
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct Empty {}

// Status/Version Endpoints
// ========================

/// Response for /status endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
  /// Service identifier
  pub service: String,

  /// Health indicator
  pub status: String,

  /// Crate version
  pub version: String,

  /// Records currently in the local incident log
  pub record_count: usize,

  /// Configured embedding service base URL
  pub embedding_url: String,

  /// Configured vector index base URL
  pub index_url: String,

  /// Whether an archive mirror is configured
  pub archive_configured: bool,
}

/// Response for /version endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionResponse {
  /// Current crate version
  pub version: String,
}

// Logs Endpoint
// =============

/// Response for /logs endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LogsResponse {
  /// Journal entries, newest first
  pub logs: Vec<LogEntry>,
}

/// Individual log entry (re-exported from foghorn)
pub type LogEntry = foghorn::journal::JournalEntry;

// Agents Endpoint
// ===============

/// Response for /agents endpoint
#[derive(Debug, Serialize)]
pub struct AgentsResponse {
  /// Manifests for every agent this service describes
  pub agents: Vec<AgentManifest>,
}

// Tool Endpoints
// ==============

/// Response for every /tools endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ToolResponse {
  /// Tool output; tool-level failures are reported here as text
  pub result: String,
}

// Helper Functions
// ================

impl<T> BaseResponse<T> {
  /// Create a successful response
  pub fn success(data: T, transaction_id: Uuid) -> Self {
    Self {
      api_version: env!("CARGO_PKG_VERSION").to_string(),
      transaction_id,
      errors: Vec::new(),
      data,
    }
  }
}

impl BaseResponse<Empty> {
  /// Create an error response
  pub fn error(errors: Vec<ApiError>, transaction_id: Uuid) -> Self {
    Self {
      api_version: env!("CARGO_PKG_VERSION").to_string(),
      transaction_id,
      errors,
      data: Empty {},
    }
  }
}

impl ApiError {
  /// Create a new API error
  pub fn new(key: &str, message: &str) -> Self {
    Self {
      key: key.to_string(),
      message: message.to_string(),
      context: serde_json::Value::Null,
    }
  }
}
