//! Tool dispatch. The agent runtime hands over a tool name and a JSON
//! argument object; everything here routes that to the right pipeline and
//! returns plain text. Failures never escape as errors, they come back as
//! descriptive strings inside the result.

use anyhow::{anyhow, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::TriageConfig;
use crate::incident::IncidentRecord;
use crate::ingest::{ingestor_from_config, Ingestor};
use crate::patterns::analyze_incident_patterns;
use crate::plan::suggest_resolution_steps;
use crate::retrieve::{retriever_from_config, Retriever, DEFAULT_NEIGHBORS};

/// One tool invocation as the runtime sends it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
  pub name: String,
  #[serde(default)]
  pub arguments: Value,
}

/// Arguments for `batch_ingest_incidents`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BatchIngestArgs {
  /// Records to ingest, in order
  pub incidents: Vec<IncidentRecord>,
}

/// Arguments for `retrieve_similar_incidents`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RetrieveArgs {
  /// Free-text description of what to look for
  pub query: String,
  /// How many neighbors to request from the index
  #[serde(default = "default_neighbors")]
  pub num_neighbors: usize,
}

fn default_neighbors() -> usize {
  DEFAULT_NEIGHBORS
}

/// Arguments for `analyze_incident_patterns`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeArgs {
  /// Description of the incident under triage
  pub incident_description: String,
  /// Affected service or system
  pub service_impact: String,
}

/// Arguments for `suggest_resolution_steps`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlanArgs {
  /// Retrieved similar-incident text to mine for proven steps
  pub context_data: String,
  /// The incident being resolved, as a JSON object
  #[serde(default)]
  pub incident_details: Value,
}

/// The six tools the agents can call, wired to live pipelines.
pub struct Toolbox {
  ingestor: Ingestor,
  retriever: Retriever,
}

impl Toolbox {
  pub fn new(ingestor: Ingestor, retriever: Retriever) -> Self {
    Self { ingestor, retriever }
  }

  /// Production wiring from configuration
  pub fn from_config(config: &TriageConfig) -> Result<Self> {
    Ok(Self::new(ingestor_from_config(config)?, retriever_from_config(config)?))
  }

  /// Route a tool call by name. Unknown names and malformed arguments
  /// come back as error text, same as any tool-level failure.
  pub async fn dispatch(&self, call: &ToolCall) -> String {
    foghorn::debug!(&format!("Dispatching tool call: {}", call.name));
    match self.try_dispatch(call).await {
      Ok(result) => result,
      Err(e) => format!("Tool call failed: {e}"),
    }
  }

  async fn try_dispatch(&self, call: &ToolCall) -> Result<String> {
    match call.name.as_str() {
      "validate_incident" => {
        let record: IncidentRecord = parse_args(&call.arguments)?;
        Ok(record.validation_status())
      }
      "ingest_incident" => {
        let record: IncidentRecord = parse_args(&call.arguments)?;
        Ok(self.ingestor.ingest_incident(&record).await)
      }
      "batch_ingest_incidents" => {
        let args: BatchIngestArgs = parse_args(&call.arguments)?;
        Ok(self.ingestor.batch_ingest(&args.incidents).await)
      }
      "retrieve_similar_incidents" => {
        let args: RetrieveArgs = parse_args(&call.arguments)?;
        Ok(self.retriever.retrieve_context(&args.query, args.num_neighbors).await)
      }
      "analyze_incident_patterns" => {
        let args: AnalyzeArgs = parse_args(&call.arguments)?;
        Ok(
          analyze_incident_patterns(&self.retriever, &args.incident_description, &args.service_impact)
            .await,
        )
      }
      "suggest_resolution_steps" => {
        let args: PlanArgs = parse_args(&call.arguments)?;
        Ok(suggest_resolution_steps(&args.context_data, &args.incident_details))
      }
      other => Err(anyhow!("Unknown tool: {other}")),
    }
  }

  pub fn ingestor(&self) -> &Ingestor {
    &self.ingestor
  }

  pub fn retriever(&self) -> &Retriever {
    &self.retriever
  }
}

fn parse_args<T: serde::de::DeserializeOwned>(arguments: &Value) -> Result<T> {
  serde_json::from_value(arguments.clone()).map_err(|e| anyhow!("Invalid tool arguments: {e}"))
}
