//! Vector index client: upserts datapoints and runs nearest-neighbor
//! queries against the external index service.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;

use crate::config::TriageConfig;

/// One indexed vector, keyed by the derived storage key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDatapoint {
  pub datapoint_id: String,
  pub feature_vector: Vec<f32>,
}

/// One nearest-neighbor match. Lower distance means closer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neighbor {
  pub datapoint_id: String,
  pub distance: f32,
}

#[derive(Debug, Serialize)]
struct UpsertRequest {
  datapoints: Vec<IndexDatapoint>,
}

#[derive(Debug, Serialize)]
struct NeighborQuery {
  feature_vector: Vec<f32>,
  neighbor_count: usize,
}

#[derive(Debug, Deserialize)]
struct NeighborResponse {
  neighbors: Vec<Neighbor>,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
  async fn upsert(&self, datapoints: Vec<IndexDatapoint>) -> Result<()>;
  async fn find_neighbors(&self, vector: &[f32], count: usize) -> Result<Vec<Neighbor>>;
}

/// Production client for the external vector index
pub struct HttpVectorIndex {
  client: Client,
  base_url: String,
  index_name: String,
}

impl HttpVectorIndex {
  pub fn new(config: &TriageConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.http_timeout_secs))
      .build()
      .map_err(|e| anyhow!("Failed to build index HTTP client: {e}"))?;

    Ok(Self { client, base_url: config.index_url.clone(), index_name: config.index_name.clone() })
  }

  fn endpoint(&self, verb: &str) -> String {
    format!("{}/v1/indexes/{}:{verb}", self.base_url, self.index_name)
  }
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
  async fn upsert(&self, datapoints: Vec<IndexDatapoint>) -> Result<()> {
    let request = UpsertRequest { datapoints };

    let response = self.client.post(self.endpoint("upsertDatapoints")).json(&request).send().await?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      return Err(anyhow!("Index upsert returned {status}: {body}"));
    }

    Ok(())
  }

  async fn find_neighbors(&self, vector: &[f32], count: usize) -> Result<Vec<Neighbor>> {
    let request = NeighborQuery { feature_vector: vector.to_vec(), neighbor_count: count };

    let response = self.client.post(self.endpoint("findNeighbors")).json(&request).send().await?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      return Err(anyhow!("Neighbor query returned {status}: {body}"));
    }

    let parsed: NeighborResponse = response.json().await?;
    Ok(parsed.neighbors)
  }
}

/// Brute-force in-memory index double. Upserts replace by id; queries rank
/// every stored point by Euclidean distance.
#[derive(Default)]
pub struct MemoryVectorIndex {
  points: RwLock<Vec<IndexDatapoint>>,
}

impl MemoryVectorIndex {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.points.read().unwrap_or_else(|e| e.into_inner()).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
  a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum::<f32>().sqrt()
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
  async fn upsert(&self, datapoints: Vec<IndexDatapoint>) -> Result<()> {
    let mut points = self.points.write().unwrap_or_else(|e| e.into_inner());

    for datapoint in datapoints {
      points.retain(|existing| existing.datapoint_id != datapoint.datapoint_id);
      points.push(datapoint);
    }

    Ok(())
  }

  async fn find_neighbors(&self, vector: &[f32], count: usize) -> Result<Vec<Neighbor>> {
    let points = self.points.read().unwrap_or_else(|e| e.into_inner());

    let mut neighbors: Vec<Neighbor> = points
      .iter()
      .map(|point| Neighbor {
        datapoint_id: point.datapoint_id.clone(),
        distance: euclidean_distance(&point.feature_vector, vector),
      })
      .collect();

    neighbors.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
    neighbors.truncate(count);
    Ok(neighbors)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn upsert_replaces_existing_ids() -> Result<()> {
    let index = MemoryVectorIndex::new();

    index
      .upsert(vec![IndexDatapoint { datapoint_id: "1000".to_string(), feature_vector: vec![1.0] }])
      .await?;
    index
      .upsert(vec![IndexDatapoint { datapoint_id: "1000".to_string(), feature_vector: vec![2.0] }])
      .await?;

    assert_eq!(index.len(), 1);
    Ok(())
  }

  #[tokio::test]
  async fn neighbors_rank_by_distance() -> Result<()> {
    let index = MemoryVectorIndex::new();
    index
      .upsert(vec![
        IndexDatapoint { datapoint_id: "far".to_string(), feature_vector: vec![10.0, 0.0] },
        IndexDatapoint { datapoint_id: "near".to_string(), feature_vector: vec![1.0, 0.0] },
        IndexDatapoint { datapoint_id: "exact".to_string(), feature_vector: vec![0.0, 0.0] },
      ])
      .await?;

    let neighbors = index.find_neighbors(&[0.0, 0.0], 2).await?;

    assert_eq!(neighbors.len(), 2);
    assert_eq!(neighbors[0].datapoint_id, "exact");
    assert_eq!(neighbors[0].distance, 0.0);
    assert_eq!(neighbors[1].datapoint_id, "near");
    Ok(())
  }

  #[tokio::test]
  async fn empty_index_returns_no_neighbors() -> Result<()> {
    let index = MemoryVectorIndex::new();
    assert!(index.find_neighbors(&[1.0], 5).await?.is_empty());
    Ok(())
  }
}
