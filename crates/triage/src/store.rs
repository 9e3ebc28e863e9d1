//! Local append-only JSONL log of stored incidents. This is the durability
//! fallback when the vector index is unreachable, and the join source that
//! turns neighbor ids back into text at query time. Write-only; the whole
//! file is re-read on every lookup.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::incident::StoredRecord;

#[derive(Clone)]
pub struct IncidentLog {
  path: PathBuf,
}

impl IncidentLog {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Append one record as a single JSON line, creating the file and its
  /// parent directory on first write
  pub fn append(&self, record: &StoredRecord) -> Result<()> {
    self.append_all(std::slice::from_ref(record))
  }

  /// Append several records in one write
  pub fn append_all(&self, records: &[StoredRecord]) -> Result<()> {
    if records.is_empty() {
      return Ok(());
    }

    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)
          .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
      }
    }

    let mut lines = String::new();
    for record in records {
      lines.push_str(&serde_json::to_string(record)?);
      lines.push('\n');
    }

    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.path)
      .with_context(|| format!("Failed to open incident log {}", self.path.display()))?;

    file.write_all(lines.as_bytes())?;
    Ok(())
  }

  /// Load every stored record. Unparseable lines are skipped with a warning
  /// so one corrupt write cannot poison retrieval.
  pub fn load(&self) -> Result<Vec<StoredRecord>> {
    if !self.path.exists() {
      return Ok(Vec::new());
    }

    let contents = std::fs::read_to_string(&self.path)
      .with_context(|| format!("Failed to read incident log {}", self.path.display()))?;

    let mut records = Vec::new();
    for (index, line) in contents.lines().enumerate() {
      if line.trim().is_empty() {
        continue;
      }

      match serde_json::from_str::<StoredRecord>(line) {
        Ok(record) => records.push(record),
        Err(e) => {
          foghorn::warn!(&format!("Skipping unparseable incident log line {}: {e}", index + 1));
        }
      }
    }

    Ok(records)
  }

  /// Exact-id lookup over the fully loaded log
  pub fn find(&self, id: &str) -> Result<Option<StoredRecord>> {
    Ok(self.load()?.into_iter().find(|record| record.id == id))
  }

  pub fn count(&self) -> Result<usize> {
    Ok(self.load()?.len())
  }

  /// Count records per severity, most frequent first
  pub fn severity_tallies(&self) -> Result<Vec<(String, usize)>> {
    self.tally(|record| record.metadata.severity.clone())
  }

  /// Count records per affected service, most frequent first
  pub fn service_tallies(&self) -> Result<Vec<(String, usize)>> {
    self.tally(|record| record.metadata.service_impact.clone())
  }

  fn tally<F>(&self, key: F) -> Result<Vec<(String, usize)>>
  where
    F: Fn(&StoredRecord) -> String,
  {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in self.load()? {
      *counts.entry(key(&record)).or_insert(0) += 1;
    }

    let mut tallies: Vec<(String, usize)> = counts.into_iter().collect();
    tallies.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(tallies)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::incident::IncidentRecord;
  use anyhow::Result;
  use tempfile::TempDir;

  fn record(id: &str, severity: &str, impact: &str) -> StoredRecord {
    IncidentRecord {
      incident_id: id.to_string(),
      timestamp: "2024-08-20T19:23:00Z".to_string(),
      severity: severity.to_string(),
      service_impact: impact.to_string(),
      incident_description: "description".to_string(),
      resolution_steps: "steps".to_string(),
      root_cause: "cause".to_string(),
    }
    .to_stored(vec![0.1, 0.2])
  }

  #[test]
  fn append_creates_file_and_parent_directory() -> Result<()> {
    let dir = TempDir::new()?;
    let log = IncidentLog::new(dir.path().join("nested").join("incidents.jsonl"));

    log.append(&record("INC-1", "High", "4G Outage"))?;

    assert!(log.path().exists());
    assert_eq!(log.count()?, 1);
    Ok(())
  }

  #[test]
  fn load_returns_empty_for_missing_file() -> Result<()> {
    let dir = TempDir::new()?;
    let log = IncidentLog::new(dir.path().join("incidents.jsonl"));

    assert!(log.load()?.is_empty());
    assert_eq!(log.count()?, 0);
    Ok(())
  }

  #[test]
  fn find_matches_exact_id_only() -> Result<()> {
    let dir = TempDir::new()?;
    let log = IncidentLog::new(dir.path().join("incidents.jsonl"));

    log.append(&record("INC-1000", "High", "4G Outage"))?;
    log.append(&record("INC-100", "Low", "DNS"))?;

    let found = log.find("1000")?.expect("record stored under stripped key");
    assert_eq!(found.metadata.original_id, "INC-1000");
    assert!(log.find("10")?.is_none());
    Ok(())
  }

  #[test]
  fn corrupt_lines_are_skipped() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("incidents.jsonl");
    let log = IncidentLog::new(&path);

    log.append(&record("INC-1", "High", "4G Outage"))?;
    std::fs::write(
      &path,
      format!("{}not json\n", std::fs::read_to_string(&path)?),
    )?;
    log.append(&record("INC-2", "Low", "DNS"))?;

    assert_eq!(log.count()?, 2);
    Ok(())
  }

  #[test]
  fn tallies_sort_by_count_descending() -> Result<()> {
    let dir = TempDir::new()?;
    let log = IncidentLog::new(dir.path().join("incidents.jsonl"));

    log.append_all(&[
      record("INC-1", "High", "4G Outage"),
      record("INC-2", "High", "DNS"),
      record("INC-3", "Low", "DNS"),
    ])?;

    let severities = log.severity_tallies()?;
    assert_eq!(severities[0], ("High".to_string(), 2));
    assert_eq!(severities[1], ("Low".to_string(), 1));

    let services = log.service_tallies()?;
    assert_eq!(services[0], ("DNS".to_string(), 2));
    Ok(())
  }
}
