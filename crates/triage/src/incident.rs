//! Incident records: the unit of everything this service stores and
//! retrieves. Validation, composed search text, and the stored JSONL form
//! all live here.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Severity levels accepted by the validator, lowest to highest.
pub const SEVERITY_LEVELS: [&str; 4] = ["Low", "Medium", "High", "Critical"];

/// Incident severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum Severity {
  Low,
  Medium,
  High,
  Critical,
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid severity level: {0}")]
pub struct InvalidSeverity(String);

impl FromStr for Severity {
  type Err = InvalidSeverity;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Low" => Ok(Severity::Low),
      "Medium" => Ok(Severity::Medium),
      "High" => Ok(Severity::High),
      "Critical" => Ok(Severity::Critical),
      other => Err(InvalidSeverity(other.to_string())),
    }
  }
}

impl std::fmt::Display for Severity {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let label = match self {
      Severity::Low => "Low",
      Severity::Medium => "Medium",
      Severity::High => "High",
      Severity::Critical => "Critical",
    };
    write!(f, "{label}")
  }
}

/// One network incident as submitted by a caller. Every field is required
/// for storage; `#[serde(default)]` lets incomplete submissions deserialize
/// so the validator can name what is missing instead of serde rejecting the
/// payload outright.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IncidentRecord {
  /// Unique identifier, expected to follow INC-XXXX
  #[serde(default)]
  pub incident_id: String,

  /// When the incident occurred, ISO 8601
  #[serde(default)]
  pub timestamp: String,

  /// One of Low, Medium, High, Critical
  #[serde(default)]
  pub severity: String,

  /// Affected service, e.g. "4G Service Outage"
  #[serde(default)]
  pub service_impact: String,

  /// Free-text description of what happened
  #[serde(default)]
  pub incident_description: String,

  /// Free-text steps taken to resolve the incident
  #[serde(default)]
  pub resolution_steps: String,

  /// Free-text root cause
  #[serde(default)]
  pub root_cause: String,
}

impl IncidentRecord {
  /// Field name/value pairs in validation order
  fn required_fields(&self) -> [(&'static str, &str); 7] {
    [
      ("incident_id", &self.incident_id),
      ("timestamp", &self.timestamp),
      ("severity", &self.severity),
      ("service_impact", &self.service_impact),
      ("incident_description", &self.incident_description),
      ("resolution_steps", &self.resolution_steps),
      ("root_cause", &self.root_cause),
    ]
  }

  /// Collect every validation violation, in check order. Empty means valid.
  /// Format/membership checks are skipped for empty fields so each defect
  /// is reported exactly once.
  pub fn validate(&self) -> Vec<String> {
    let mut errors = Vec::new();

    for (name, value) in self.required_fields() {
      if value.trim().is_empty() {
        errors.push(format!("Missing or empty required field: {name}"));
      }
    }

    if !self.severity.trim().is_empty() && !SEVERITY_LEVELS.contains(&self.severity.as_str()) {
      errors.push(format!(
        "Invalid severity level. Must be one of: {}",
        SEVERITY_LEVELS.join(", ")
      ));
    }

    if !self.incident_id.trim().is_empty() && !self.incident_id.starts_with("INC-") {
      errors.push("Incident ID should follow format: INC-XXXX".to_string());
    }

    if !self.timestamp.trim().is_empty() && !timestamp_is_valid(&self.timestamp) {
      errors.push(
        "Invalid timestamp format. Use ISO 8601 format (e.g., 2024-01-01T10:00:00Z)".to_string(),
      );
    }

    errors
  }

  /// The tool-facing validation contract: the literal `VALID`, or every
  /// violation joined with `; `.
  pub fn validation_status(&self) -> String {
    let errors = self.validate();
    if errors.is_empty() {
      "VALID".to_string()
    } else {
      errors.join("; ")
    }
  }

  pub fn is_valid(&self) -> bool {
    self.validate().is_empty()
  }

  /// The composed text indexed for similarity search. Label order is part
  /// of the storage contract: retrieval-side parsing splits on these labels.
  pub fn composed_text(&self) -> String {
    format!(
      "Incident ID: {} | Severity: {} | Service Impact: {} | Description: {} | Resolution Steps: {} | Root Cause: {} | Timestamp: {}",
      self.incident_id,
      self.severity,
      self.service_impact,
      self.incident_description,
      self.resolution_steps,
      self.root_cause,
      self.timestamp
    )
  }

  /// Key used for the vector index datapoint and the local log `id` field
  pub fn storage_key(&self) -> &str {
    storage_key(&self.incident_id)
  }

  /// Build the stored form with its embedding; stamps the ingestion time
  pub fn to_stored(&self, embedding: Vec<f32>) -> StoredRecord {
    StoredRecord {
      id: self.storage_key().to_string(),
      text: self.composed_text(),
      metadata: RecordMetadata {
        severity: self.severity.clone(),
        service_impact: self.service_impact.clone(),
        timestamp: self.timestamp.clone(),
        ingestion_time: Utc::now().to_rfc3339(),
        original_id: self.incident_id.clone(),
      },
      embedding: Some(embedding),
    }
  }
}

/// Strip one `INC-` prefix; anything else passes through verbatim
pub fn storage_key(incident_id: &str) -> &str {
  incident_id.strip_prefix("INC-").unwrap_or(incident_id)
}

/// ISO 8601 acceptance: RFC 3339 (trailing `Z` or explicit offset), naive
/// datetime with optional fractional seconds, or a bare date.
pub fn timestamp_is_valid(timestamp: &str) -> bool {
  DateTime::parse_from_rfc3339(timestamp).is_ok()
    || NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
    || NaiveDate::parse_from_str(timestamp, "%Y-%m-%d").is_ok()
}

/// One line of the local JSONL log and the archive mirror
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
  /// Derived storage key, also the vector index datapoint id
  pub id: String,

  /// Composed text the embedding was computed from
  pub text: String,

  /// Original field values plus ingestion bookkeeping
  pub metadata: RecordMetadata,

  /// Embedding vector; absent on lines written before embeddings were kept
  #[serde(skip_serializing_if = "Option::is_none")]
  pub embedding: Option<Vec<f32>>,
}

/// Metadata carried on every stored record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetadata {
  pub severity: String,
  pub service_impact: String,
  pub timestamp: String,
  pub ingestion_time: String,
  pub original_id: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_record() -> IncidentRecord {
    IncidentRecord {
      incident_id: "INC-1000".to_string(),
      timestamp: "2024-08-20T19:23:00Z".to_string(),
      severity: "High".to_string(),
      service_impact: "4G Service Outage".to_string(),
      incident_description: "High packet loss observed in Manchester".to_string(),
      resolution_steps: "Restarted BGP processes on the primary router".to_string(),
      root_cause: "Fibre cut due to construction".to_string(),
    }
  }

  #[test]
  fn valid_record_reports_valid() {
    assert_eq!(sample_record().validation_status(), "VALID");
  }

  #[test]
  fn missing_fields_are_each_named() {
    let record = IncidentRecord::default();
    let status = record.validation_status();

    assert_ne!(status, "VALID");
    for field in [
      "incident_id",
      "timestamp",
      "severity",
      "service_impact",
      "incident_description",
      "resolution_steps",
      "root_cause",
    ] {
      assert!(
        status.contains(&format!("Missing or empty required field: {field}")),
        "missing error for {field} in: {status}"
      );
    }
  }

  #[test]
  fn invalid_severity_is_rejected() {
    let mut record = sample_record();
    record.severity = "Catastrophic".to_string();

    let status = record.validation_status();
    assert_eq!(
      status,
      "Invalid severity level. Must be one of: Low, Medium, High, Critical"
    );
  }

  #[test]
  fn bad_id_prefix_is_rejected() {
    let mut record = sample_record();
    record.incident_id = "TICKET-7".to_string();

    assert_eq!(record.validation_status(), "Incident ID should follow format: INC-XXXX");
  }

  #[test]
  fn bad_timestamp_is_rejected() {
    let mut record = sample_record();
    record.timestamp = "20/08/2024 19:23".to_string();

    assert_eq!(
      record.validation_status(),
      "Invalid timestamp format. Use ISO 8601 format (e.g., 2024-01-01T10:00:00Z)"
    );
  }

  #[test]
  fn violations_join_with_semicolons() {
    let mut record = sample_record();
    record.severity = "urgent".to_string();
    record.incident_id = "1000".to_string();

    let status = record.validation_status();
    assert_eq!(
      status,
      "Invalid severity level. Must be one of: Low, Medium, High, Critical; Incident ID should follow format: INC-XXXX"
    );
  }

  #[test]
  fn timestamp_acceptance() {
    assert!(timestamp_is_valid("2024-01-01T10:00:00Z"));
    assert!(timestamp_is_valid("2024-01-01T10:00:00+02:00"));
    assert!(timestamp_is_valid("2024-01-01T10:00:00"));
    assert!(timestamp_is_valid("2024-01-01T10:00:00.250"));
    assert!(timestamp_is_valid("2024-01-01"));
    assert!(!timestamp_is_valid("January 1st"));
    assert!(!timestamp_is_valid("2024-13-01T10:00:00Z"));
  }

  #[test]
  fn storage_key_strips_inc_prefix_only() {
    assert_eq!(storage_key("INC-1000"), "1000");
    assert_eq!(storage_key("ABC-1"), "ABC-1");
    assert_eq!(storage_key("INC-INC-5"), "INC-5");
    assert_eq!(storage_key(""), "");
  }

  #[test]
  fn composed_text_is_deterministic_and_ordered() {
    let record = sample_record();
    let text = record.composed_text();

    assert_eq!(text, record.composed_text());

    let id_pos = text.find("Incident ID:").unwrap();
    let severity_pos = text.find("Severity:").unwrap();
    let impact_pos = text.find("Service Impact:").unwrap();
    let description_pos = text.find("Description:").unwrap();
    let steps_pos = text.find("Resolution Steps:").unwrap();
    let cause_pos = text.find("Root Cause:").unwrap();
    let timestamp_pos = text.find("Timestamp:").unwrap();

    assert!(id_pos < severity_pos);
    assert!(severity_pos < impact_pos);
    assert!(impact_pos < description_pos);
    assert!(description_pos < steps_pos);
    assert!(steps_pos < cause_pos);
    assert!(cause_pos < timestamp_pos);
  }

  #[test]
  fn severity_parses_exact_labels_only() {
    assert_eq!("Critical".parse::<Severity>(), Ok(Severity::Critical));
    assert!("critical".parse::<Severity>().is_err());
    assert!("".parse::<Severity>().is_err());
    assert!(Severity::Low < Severity::Critical);
  }

  #[test]
  fn stored_record_round_trips_as_json() {
    let stored = sample_record().to_stored(vec![0.25, 0.5]);
    let line = serde_json::to_string(&stored).unwrap();
    let parsed: StoredRecord = serde_json::from_str(&line).unwrap();

    assert_eq!(parsed.id, "1000");
    assert_eq!(parsed.metadata.original_id, "INC-1000");
    assert_eq!(parsed.embedding, Some(vec![0.25, 0.5]));
    assert!(parsed.text.starts_with("Incident ID: INC-1000 | Severity: High"));
  }

  #[test]
  fn incomplete_json_still_deserializes_for_validation() {
    let record: IncidentRecord =
      serde_json::from_str(r#"{"incident_id": "INC-7", "severity": "Low"}"#).unwrap();

    let status = record.validation_status();
    assert!(status.contains("Missing or empty required field: timestamp"));
    assert!(!status.contains("Missing or empty required field: severity"));
  }
}
