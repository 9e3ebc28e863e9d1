//! Service configuration, read from the environment with workable local
//! defaults. Every external collaborator (embedding service, vector index,
//! archive mirror) is addressed by plain HTTP base URL.

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_EMBEDDING_URL: &str = "http://localhost:8091";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";
pub const DEFAULT_INDEX_URL: &str = "http://localhost:8092";
pub const DEFAULT_INDEX_NAME: &str = "incident-embeddings";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct TriageConfig {
  /// Embedding service base URL
  pub embedding_url: String,
  /// Model name sent with every embedding request
  pub embedding_model: String,
  /// Vector index base URL
  pub index_url: String,
  /// Index name used in upsert/query paths
  pub index_name: String,
  /// Cloud object holding the archive mirror; mirroring is skipped when unset
  pub archive_url: Option<String>,
  /// Bearer token for the archive object, if the store requires one
  pub archive_token: Option<String>,
  /// Local JSONL incident log
  pub log_file: PathBuf,
  /// Client-side timeout applied to every external HTTP call
  pub http_timeout_secs: u64,
}

impl Default for TriageConfig {
  fn default() -> Self {
    Self {
      embedding_url: DEFAULT_EMBEDDING_URL.to_string(),
      embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
      index_url: DEFAULT_INDEX_URL.to_string(),
      index_name: DEFAULT_INDEX_NAME.to_string(),
      archive_url: None,
      archive_token: None,
      log_file: default_log_file(),
      http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
    }
  }
}

impl TriageConfig {
  /// Build from `TRIAGE_*` environment variables, falling back to defaults.
  /// URLs are validated here so a typo surfaces before any tool runs.
  pub fn from_env() -> Result<Self> {
    let defaults = Self::default();

    let config = Self {
      embedding_url: env_or("TRIAGE_EMBEDDING_URL", &defaults.embedding_url),
      embedding_model: env_or("TRIAGE_EMBEDDING_MODEL", &defaults.embedding_model),
      index_url: env_or("TRIAGE_INDEX_URL", &defaults.index_url),
      index_name: env_or("TRIAGE_INDEX_NAME", &defaults.index_name),
      archive_url: env_opt("TRIAGE_ARCHIVE_URL"),
      archive_token: env_opt("TRIAGE_ARCHIVE_TOKEN"),
      log_file: env_opt("TRIAGE_LOG_FILE").map(PathBuf::from).unwrap_or(defaults.log_file),
      http_timeout_secs: match env_opt("TRIAGE_HTTP_TIMEOUT_SECS") {
        Some(raw) => raw
          .parse()
          .map_err(|e| anyhow!("TRIAGE_HTTP_TIMEOUT_SECS is not an integer: {e}"))?,
        None => defaults.http_timeout_secs,
      },
    };

    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    Url::parse(&self.embedding_url)
      .map_err(|e| anyhow!("TRIAGE_EMBEDDING_URL is not a valid URL: {e}"))?;
    Url::parse(&self.index_url).map_err(|e| anyhow!("TRIAGE_INDEX_URL is not a valid URL: {e}"))?;

    if let Some(archive_url) = &self.archive_url {
      Url::parse(archive_url).map_err(|e| anyhow!("TRIAGE_ARCHIVE_URL is not a valid URL: {e}"))?;
    }

    Ok(())
  }
}

fn env_or(name: &str, default: &str) -> String {
  env_opt(name).unwrap_or_else(|| default.to_string())
}

fn env_opt(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Platform data directory, falling back to the working directory when the
/// platform offers none
fn default_log_file() -> PathBuf {
  dirs::data_dir()
    .map(|dir| dir.join("triage").join("incidents.jsonl"))
    .unwrap_or_else(|| PathBuf::from("incidents.jsonl"))
}
