//! Archive mirror: a single cloud object holding a copy of the incident
//! log. Appends are read-modify-write against the whole object.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::RwLock;
use std::time::Duration;

use crate::config::TriageConfig;

#[async_trait]
pub trait ObjectArchive: Send + Sync {
  /// Current object contents; `None` when the object does not exist yet
  async fn download(&self) -> Result<Option<String>>;

  /// Replace the object contents
  async fn upload(&self, contents: &str) -> Result<()>;

  /// Append by downloading, concatenating, and re-uploading. Nothing guards
  /// the window between the download and the upload, so two concurrent
  /// appenders can lose one of the writes.
  async fn append(&self, lines: &str) -> Result<()> {
    let mut combined = self.download().await?.unwrap_or_default();

    if !combined.is_empty() && !combined.ends_with('\n') {
      combined.push('\n');
    }
    combined.push_str(lines);

    self.upload(&combined).await
  }
}

/// Production client: GET/PUT one object URL with an optional bearer token
pub struct HttpObjectArchive {
  client: Client,
  url: String,
  token: Option<String>,
}

impl HttpObjectArchive {
  pub fn new(config: &TriageConfig, url: String) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.http_timeout_secs))
      .build()
      .map_err(|e| anyhow!("Failed to build archive HTTP client: {e}"))?;

    Ok(Self { client, url, token: config.archive_token.clone() })
  }

  fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match &self.token {
      Some(token) => request.bearer_auth(token),
      None => request,
    }
  }
}

#[async_trait]
impl ObjectArchive for HttpObjectArchive {
  async fn download(&self) -> Result<Option<String>> {
    let response = self.authorize(self.client.get(&self.url)).send().await?;

    if response.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      return Err(anyhow!("Archive download returned {status}: {body}"));
    }

    Ok(Some(response.text().await?))
  }

  async fn upload(&self, contents: &str) -> Result<()> {
    let response =
      self.authorize(self.client.put(&self.url)).body(contents.to_string()).send().await?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      return Err(anyhow!("Archive upload returned {status}: {body}"));
    }

    Ok(())
  }
}

/// In-memory archive double
#[derive(Default)]
pub struct MemoryArchive {
  contents: RwLock<Option<String>>,
}

impl MemoryArchive {
  pub fn new() -> Self {
    Self::default()
  }

  /// Snapshot of the stored object for assertions
  pub fn snapshot(&self) -> Option<String> {
    self.contents.read().unwrap_or_else(|e| e.into_inner()).clone()
  }
}

#[async_trait]
impl ObjectArchive for MemoryArchive {
  async fn download(&self) -> Result<Option<String>> {
    Ok(self.snapshot())
  }

  async fn upload(&self, contents: &str) -> Result<()> {
    *self.contents.write().unwrap_or_else(|e| e.into_inner()) = Some(contents.to_string());
    Ok(())
  }
}
