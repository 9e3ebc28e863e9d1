//! Ingestion pipeline: validate, embed, then write to the three storage
//! targets. Every failure is folded into the returned status string; the
//! caller is an LLM tool loop that can only read text.

use anyhow::Result;
use std::sync::Arc;

use crate::clients::{EmbeddingService, IndexDatapoint, ObjectArchive, VectorIndex};
use crate::config::TriageConfig;
use crate::incident::{IncidentRecord, StoredRecord};
use crate::store::IncidentLog;

/// Number of batch error messages shown verbatim before summarizing
const BATCH_ERROR_DISPLAY_CAP: usize = 10;

pub struct Ingestor {
  embeddings: Arc<dyn EmbeddingService>,
  index: Arc<dyn VectorIndex>,
  archive: Option<Arc<dyn ObjectArchive>>,
  log: IncidentLog,
}

impl Ingestor {
  pub fn new(
    embeddings: Arc<dyn EmbeddingService>,
    index: Arc<dyn VectorIndex>,
    archive: Option<Arc<dyn ObjectArchive>>,
    log: IncidentLog,
  ) -> Self {
    Self { embeddings, index, archive, log }
  }

  /// Ingest one record. The three storage attempts are independently
  /// guarded: a failed index upsert still leaves the local line and the
  /// archive mirror in place, and vice versa.
  pub async fn ingest_incident(&self, record: &IncidentRecord) -> String {
    let status = record.validation_status();
    if status != "VALID" {
      return format!("Validation failed: {status}");
    }

    let embedding = match self.embeddings.embed(&record.composed_text()).await {
      Ok(vector) => vector,
      Err(e) => {
        foghorn::error!(&format!("Embedding request failed for {}: {e}", record.incident_id));
        return format!("Error generating embedding: {e}");
      }
    };

    let stored = record.to_stored(embedding.clone());

    let local_outcome = self.log.append(&stored);
    let index_outcome = self
      .index
      .upsert(vec![IndexDatapoint { datapoint_id: stored.id.clone(), feature_vector: embedding }])
      .await;
    let archive_outcome = self.mirror(std::slice::from_ref(&stored)).await;

    let all_ok = local_outcome.is_ok()
      && index_outcome.is_ok()
      && archive_outcome.as_ref().map_or(true, Result::is_ok);

    let header = if all_ok {
      foghorn::success!(&format!("Ingested incident {}", record.incident_id));
      format!("Ingested incident {} (storage key: {})", record.incident_id, stored.id)
    } else {
      foghorn::warn!(&format!("Partial ingest for incident {}", record.incident_id));
      format!("Partially ingested incident {} (storage key: {})", record.incident_id, stored.id)
    };

    let mut report = header;
    report.push('\n');
    report.push_str(&outcome_line("local log", &local_outcome));
    report.push('\n');
    report.push_str(&outcome_line("vector index", &index_outcome));
    report.push('\n');
    report.push_str(&mirror_line(&archive_outcome));
    report
  }

  /// Ingest a list of records. Validation and embedding run per record;
  /// everything that survives is stored with one index upsert, one local
  /// write, and one archive write.
  pub async fn batch_ingest(&self, records: &[IncidentRecord]) -> String {
    let mut errors: Vec<String> = Vec::new();
    let mut stored_records: Vec<StoredRecord> = Vec::new();

    for (position, record) in records.iter().enumerate() {
      let status = record.validation_status();
      if status != "VALID" {
        errors.push(format!("Record {}: {status}", position + 1));
        continue;
      }

      match self.embeddings.embed(&record.composed_text()).await {
        Ok(embedding) => stored_records.push(record.to_stored(embedding)),
        Err(e) => errors.push(format!("Record {}: Processing error - {e}", position + 1)),
      }
    }

    foghorn::info!(&format!(
      "Batch ingest processed {} records ({} ok, {} failed)",
      records.len(),
      stored_records.len(),
      errors.len()
    ));

    let mut report = format!(
      "Batch ingestion summary:\n- Total records processed: {}\n- Successfully ingested: {}\n- Failed: {}",
      records.len(),
      stored_records.len(),
      errors.len()
    );

    if !errors.is_empty() {
      report.push_str("\n\nErrors encountered:\n");
      report.push_str(&errors.iter().take(BATCH_ERROR_DISPLAY_CAP).cloned().collect::<Vec<_>>().join("\n"));
      if errors.len() > BATCH_ERROR_DISPLAY_CAP {
        report.push_str(&format!("\n... and {} more errors", errors.len() - BATCH_ERROR_DISPLAY_CAP));
      }
    }

    if !stored_records.is_empty() {
      let datapoints = stored_records
        .iter()
        .map(|record| IndexDatapoint {
          datapoint_id: record.id.clone(),
          feature_vector: record.embedding.clone().unwrap_or_default(),
        })
        .collect();

      let index_outcome = self.index.upsert(datapoints).await;
      let local_outcome = self.log.append_all(&stored_records);
      let archive_outcome = self.mirror(&stored_records).await;

      report.push_str("\n\nStorage:\n");
      report.push_str(&outcome_line("vector index", &index_outcome));
      report.push('\n');
      report.push_str(&outcome_line("local log", &local_outcome));
      report.push('\n');
      report.push_str(&mirror_line(&archive_outcome));
    }

    report
  }

  /// Append the records to the archive object; `None` when no archive is
  /// configured
  async fn mirror(&self, records: &[StoredRecord]) -> Option<Result<()>> {
    let archive = self.archive.as_ref()?;

    let lines = match to_jsonl(records) {
      Ok(lines) => lines,
      Err(e) => return Some(Err(e)),
    };

    Some(archive.append(&lines).await)
  }
}

/// Production wiring from configuration
pub fn ingestor_from_config(config: &TriageConfig) -> Result<Ingestor> {
  let embeddings = Arc::new(crate::clients::HttpEmbeddingService::new(config)?);
  let index = Arc::new(crate::clients::HttpVectorIndex::new(config)?);
  let archive: Option<Arc<dyn ObjectArchive>> = match &config.archive_url {
    Some(url) => Some(Arc::new(crate::clients::HttpObjectArchive::new(config, url.clone())?)),
    None => None,
  };

  Ok(Ingestor::new(embeddings, index, archive, IncidentLog::new(config.log_file.clone())))
}

fn to_jsonl(records: &[StoredRecord]) -> Result<String> {
  let mut lines = String::new();
  for record in records {
    lines.push_str(&serde_json::to_string(record)?);
    lines.push('\n');
  }
  Ok(lines)
}

fn outcome_line(target: &str, outcome: &Result<()>) -> String {
  match outcome {
    Ok(()) => format!("- {target}: ok"),
    Err(e) => format!("- {target}: failed: {e}"),
  }
}

fn mirror_line(outcome: &Option<Result<()>>) -> String {
  match outcome {
    None => "- archive mirror: skipped (not configured)".to_string(),
    Some(result) => outcome_line("archive mirror", result),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clients::{MemoryArchive, MemoryVectorIndex, StaticEmbeddingService};
  use anyhow::anyhow;
  use async_trait::async_trait;
  use tempfile::TempDir;

  struct FailingEmbeddingService;

  #[async_trait]
  impl EmbeddingService for FailingEmbeddingService {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
      Err(anyhow!("embedding endpoint unreachable"))
    }
  }

  fn sample_record(id: &str) -> IncidentRecord {
    IncidentRecord {
      incident_id: id.to_string(),
      timestamp: "2024-08-20T19:23:00Z".to_string(),
      severity: "High".to_string(),
      service_impact: "4G Service Outage".to_string(),
      incident_description: "High packet loss observed in Manchester".to_string(),
      resolution_steps: "Restarted BGP processes on the primary router".to_string(),
      root_cause: "Fibre cut due to construction".to_string(),
    }
  }

  fn test_ingestor(dir: &TempDir) -> (Ingestor, Arc<MemoryVectorIndex>, Arc<MemoryArchive>) {
    let index = Arc::new(MemoryVectorIndex::new());
    let archive = Arc::new(MemoryArchive::new());
    let ingestor = Ingestor::new(
      Arc::new(StaticEmbeddingService::default()),
      index.clone(),
      Some(archive.clone()),
      IncidentLog::new(dir.path().join("incidents.jsonl")),
    );
    (ingestor, index, archive)
  }

  #[tokio::test]
  async fn ingest_writes_all_three_targets() -> Result<()> {
    let dir = TempDir::new()?;
    let (ingestor, index, archive) = test_ingestor(&dir);

    let report = ingestor.ingest_incident(&sample_record("INC-1000")).await;

    assert!(report.starts_with("Ingested incident INC-1000 (storage key: 1000)"));
    assert!(report.contains("- local log: ok"));
    assert!(report.contains("- vector index: ok"));
    assert!(report.contains("- archive mirror: ok"));

    assert_eq!(index.len(), 1);
    assert!(archive.snapshot().unwrap().contains("\"original_id\":\"INC-1000\""));
    assert_eq!(ingestor.log.count()?, 1);
    Ok(())
  }

  #[tokio::test]
  async fn invalid_record_is_rejected_before_any_storage() -> Result<()> {
    let dir = TempDir::new()?;
    let (ingestor, index, archive) = test_ingestor(&dir);

    let mut record = sample_record("INC-1");
    record.severity = String::new();

    let report = ingestor.ingest_incident(&record).await;

    assert!(report.starts_with("Validation failed:"));
    assert!(report.contains("Missing or empty required field: severity"));
    assert!(index.is_empty());
    assert!(archive.snapshot().is_none());
    assert_eq!(ingestor.log.count()?, 0);
    Ok(())
  }

  #[tokio::test]
  async fn embedding_failure_stores_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    let index = Arc::new(MemoryVectorIndex::new());
    let ingestor = Ingestor::new(
      Arc::new(FailingEmbeddingService),
      index.clone(),
      None,
      IncidentLog::new(dir.path().join("incidents.jsonl")),
    );

    let report = ingestor.ingest_incident(&sample_record("INC-2")).await;

    assert!(report.starts_with("Error generating embedding:"));
    assert!(index.is_empty());
    Ok(())
  }

  #[tokio::test]
  async fn unconfigured_archive_is_reported_as_skipped() -> Result<()> {
    let dir = TempDir::new()?;
    let ingestor = Ingestor::new(
      Arc::new(StaticEmbeddingService::default()),
      Arc::new(MemoryVectorIndex::new()),
      None,
      IncidentLog::new(dir.path().join("incidents.jsonl")),
    );

    let report = ingestor.ingest_incident(&sample_record("INC-3")).await;
    assert!(report.contains("- archive mirror: skipped (not configured)"));
    Ok(())
  }

  #[tokio::test]
  async fn batch_counts_successes_and_caps_error_display() -> Result<()> {
    let dir = TempDir::new()?;
    let (ingestor, index, _archive) = test_ingestor(&dir);

    let mut records = Vec::new();
    for i in 0..3 {
      records.push(sample_record(&format!("INC-{i}")));
    }
    for _ in 0..12 {
      records.push(IncidentRecord::default());
    }

    let report = ingestor.batch_ingest(&records).await;

    assert!(report.contains("- Total records processed: 15"));
    assert!(report.contains("- Successfully ingested: 3"));
    assert!(report.contains("- Failed: 12"));
    assert!(report.contains("Record 4: Missing or empty required field: incident_id"));
    assert!(report.contains("... and 2 more errors"));
    assert_eq!(report.matches("Record ").count(), 10);
    assert_eq!(index.len(), 3);
    Ok(())
  }

  #[tokio::test]
  async fn batch_with_no_valid_records_skips_storage() -> Result<()> {
    let dir = TempDir::new()?;
    let (ingestor, index, archive) = test_ingestor(&dir);

    let report = ingestor.batch_ingest(&[IncidentRecord::default()]).await;

    assert!(report.contains("- Successfully ingested: 0"));
    assert!(!report.contains("Storage:"));
    assert!(index.is_empty());
    assert!(archive.snapshot().is_none());
    Ok(())
  }
}
