//! Embedding service client. One text in, one vector out; batching happens
//! at the call site because every stored record embeds its own composed
//! text.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::TriageConfig;

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
  model: String,
  texts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
  embeddings: Vec<Vec<f32>>,
  #[serde(default)]
  error: Option<String>,
}

/// Seam for dependency injection: production HTTP client or a
/// deterministic double in tests
#[async_trait]
pub trait EmbeddingService: Send + Sync {
  async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Production client for the external embedding endpoint
pub struct HttpEmbeddingService {
  client: Client,
  base_url: String,
  model: String,
}

impl HttpEmbeddingService {
  pub fn new(config: &TriageConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.http_timeout_secs))
      .build()
      .map_err(|e| anyhow!("Failed to build embedding HTTP client: {e}"))?;

    Ok(Self {
      client,
      base_url: config.embedding_url.clone(),
      model: config.embedding_model.clone(),
    })
  }
}

#[async_trait]
impl EmbeddingService for HttpEmbeddingService {
  async fn embed(&self, text: &str) -> Result<Vec<f32>> {
    let request = EmbeddingRequest { model: self.model.clone(), texts: vec![text.to_string()] };

    let url = format!("{}/embeddings", self.base_url);
    let response = self.client.post(&url).json(&request).send().await?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      return Err(anyhow!("Embedding service returned {status}: {body}"));
    }

    let parsed: EmbeddingResponse = response.json().await?;
    if let Some(error) = parsed.error {
      return Err(anyhow!("Embedding service error: {error}"));
    }

    parsed
      .embeddings
      .into_iter()
      .next()
      .filter(|vector| !vector.is_empty())
      .ok_or_else(|| anyhow!("Embedding service returned no vector"))
  }
}

/// Deterministic embedding double. Folds the text bytes into a fixed number
/// of dimensions, so identical texts embed identically and the in-memory
/// index can rank a record's own text at distance zero.
pub struct StaticEmbeddingService {
  dimensions: usize,
}

impl StaticEmbeddingService {
  pub fn new(dimensions: usize) -> Self {
    Self { dimensions }
  }
}

impl Default for StaticEmbeddingService {
  fn default() -> Self {
    Self::new(8)
  }
}

#[async_trait]
impl EmbeddingService for StaticEmbeddingService {
  async fn embed(&self, text: &str) -> Result<Vec<f32>> {
    let mut vector = vec![0.0f32; self.dimensions];
    for (index, byte) in text.bytes().enumerate() {
      vector[index % self.dimensions] += f32::from(byte) / 255.0;
    }
    Ok(vector)
  }
}
