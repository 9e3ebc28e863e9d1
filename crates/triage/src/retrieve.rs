//! Retrieval pipeline: embed a free-text query, ask the index for
//! neighbors, then join the matched ids back to stored text from the local
//! log. Output is text blocks ready for an LLM context window.

use anyhow::Result;
use std::sync::Arc;

use crate::clients::{EmbeddingService, VectorIndex};
use crate::config::TriageConfig;
use crate::store::IncidentLog;

/// Literal returned when retrieval finds nothing
pub const NO_MATCHES: &str = "No similar incidents found in the database.";

/// Default neighbor count for callers that do not specify one
pub const DEFAULT_NEIGHBORS: usize = 5;

pub struct Retriever {
  embeddings: Arc<dyn EmbeddingService>,
  index: Arc<dyn VectorIndex>,
  log: IncidentLog,
}

impl Retriever {
  pub fn new(
    embeddings: Arc<dyn EmbeddingService>,
    index: Arc<dyn VectorIndex>,
    log: IncidentLog,
  ) -> Self {
    Self { embeddings, index, log }
  }

  /// Tool-facing retrieval. Failures are swallowed into the returned
  /// string; the block numbering follows neighbor rank, so a neighbor
  /// missing from the local log leaves a gap rather than renumbering.
  pub async fn retrieve_context(&self, query: &str, num_neighbors: usize) -> String {
    match self.try_retrieve(query, num_neighbors).await {
      Ok(blocks) if blocks.is_empty() => NO_MATCHES.to_string(),
      Ok(blocks) => blocks.join("\n\n"),
      Err(e) => {
        foghorn::warn!(&format!("Context retrieval failed: {e}"));
        format!("Error retrieving context: {e}")
      }
    }
  }

  async fn try_retrieve(&self, query: &str, num_neighbors: usize) -> Result<Vec<String>> {
    let vector = self.embeddings.embed(query).await?;
    let neighbors = self.index.find_neighbors(&vector, num_neighbors).await?;
    let records = self.log.load()?;

    let mut blocks = Vec::new();
    for (rank, neighbor) in neighbors.iter().enumerate() {
      let matched = records.iter().find(|record| record.id == neighbor.datapoint_id);

      match matched {
        Some(record) => blocks.push(format!(
          "=== Similar Incident {} (Similarity: {:.3}) ===\n{}",
          rank + 1,
          neighbor.distance,
          record.text
        )),
        None => {
          foghorn::verbose!(&format!(
            "Neighbor {} has no entry in the local incident log",
            neighbor.datapoint_id
          ));
        }
      }
    }

    Ok(blocks)
  }
}

/// Production wiring from configuration
pub fn retriever_from_config(config: &TriageConfig) -> Result<Retriever> {
  Ok(Retriever::new(
    Arc::new(crate::clients::HttpEmbeddingService::new(config)?),
    Arc::new(crate::clients::HttpVectorIndex::new(config)?),
    IncidentLog::new(config.log_file.clone()),
  ))
}
