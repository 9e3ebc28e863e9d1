//! Agent manifests. The agents themselves run in an external tool-calling
//! runtime; this crate only describes them: a name, instruction text, and
//! the JSON schemas of the tools each one may call.

use schemars::schema::RootSchema;
use schemars::{schema_for, JsonSchema};
use serde::Serialize;

use crate::incident::IncidentRecord;
use crate::tools::{AnalyzeArgs, BatchIngestArgs, PlanArgs, RetrieveArgs};

/// Declarative description of one callable tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
  pub name: &'static str,
  pub description: &'static str,
  pub parameters: RootSchema,
}

impl ToolSpec {
  fn of<T: JsonSchema>(name: &'static str, description: &'static str) -> Self {
    Self { name, description, parameters: schema_for!(T) }
  }
}

/// Everything the runtime needs to host one agent
#[derive(Debug, Clone, Serialize)]
pub struct AgentManifest {
  pub name: &'static str,
  pub display_name: &'static str,
  pub description: &'static str,
  pub instruction: &'static str,
  pub tools: Vec<ToolSpec>,
  pub sub_agents: Vec<&'static str>,
}

/// All agents, coordinator first
pub fn registry() -> Vec<AgentManifest> {
  vec![coordinator(), ingestion(), resolution()]
}

/// Look up one manifest by name
pub fn find(name: &str) -> Option<AgentManifest> {
  registry().into_iter().find(|manifest| manifest.name == name)
}

/// Root agent: no tools of its own, routes between the two specialists.
pub fn coordinator() -> AgentManifest {
  AgentManifest {
    name: "triage.coordinator",
    display_name: "Incident Coordinator",
    description: "Routes incident management requests between the ingestion and \
                  resolution agents and stitches multi-step workflows together.",
    instruction: COORDINATOR_INSTRUCTION,
    tools: Vec::new(),
    sub_agents: vec!["triage.ingestion", "triage.resolution"],
  }
}

/// Data-management specialist
pub fn ingestion() -> AgentManifest {
  AgentManifest {
    name: "triage.ingestion",
    display_name: "Incident Ingestion",
    description: "Validates and stores network incident records, generating \
                  embeddings for similarity search.",
    instruction: INGESTION_INSTRUCTION,
    tools: vec![
      ToolSpec::of::<IncidentRecord>(
        "validate_incident",
        "Check a single incident record against the required format and report \
         VALID or the list of problems found.",
      ),
      ToolSpec::of::<IncidentRecord>(
        "ingest_incident",
        "Validate one incident record, embed its composed text, and store it in \
         the vector index, the local log, and the archive mirror.",
      ),
      ToolSpec::of::<BatchIngestArgs>(
        "batch_ingest_incidents",
        "Ingest a list of incident records in one pass and report per-record \
         successes and failures.",
      ),
    ],
    sub_agents: Vec::new(),
  }
}

/// Analysis and remediation specialist
pub fn resolution() -> AgentManifest {
  AgentManifest {
    name: "triage.resolution",
    display_name: "Incident Resolution",
    description: "Finds similar past incidents and turns their history into \
                  pattern analysis and step-by-step remediation plans.",
    instruction: RESOLUTION_INSTRUCTION,
    tools: vec![
      ToolSpec::of::<RetrieveArgs>(
        "retrieve_similar_incidents",
        "Embed a free-text query and return the most similar stored incidents \
         as ready-to-read text blocks.",
      ),
      ToolSpec::of::<AnalyzeArgs>(
        "analyze_incident_patterns",
        "Run several retrieval queries around an incident and tally severity, \
         service impact, root cause, and resolution patterns.",
      ),
      ToolSpec::of::<PlanArgs>(
        "suggest_resolution_steps",
        "Turn retrieved similar-incident context into a phased resolution plan \
         with escalation and rollback guidance.",
      ),
    ],
    sub_agents: Vec::new(),
  }
}

const COORDINATOR_INSTRUCTION: &str = r#"You coordinate the incident triage system. Two specialist agents work under you.

## triage.ingestion - data management
Validates, stores, and indexes incident records. Use it for anything that adds or checks data: "add this incident", "import this batch", "is this record well formed".

## triage.resolution - analysis and guidance
Searches past incidents and builds remediation guidance. Use it for anything diagnostic: "what looks like this", "what usually causes this", "how do we fix it".

## Routing
- Data ingestion, validation, and import requests go to triage.ingestion.
- Troubleshooting, similarity search, and planning requests go to triage.resolution.
- Hybrid requests run in sequence. When a live incident is burning, resolve first; ingest the completed record afterwards so the next search benefits from it.

## Workflows
Standard resolution: retrieve similar incidents, run a pattern analysis when the case is unclear, then produce a resolution plan. Once the incident closes, hand the final record to ingestion.

Batch import: validate before ingesting, relay per-record failures verbatim, then run a pattern analysis when the caller wants to know what the new data changed.

## Responses
Summarize what each specialist did, keep tool output intact when the caller asked for raw detail, and always state which records were stored and which failed."#;

const INGESTION_INSTRUCTION: &str = r#"You manage incident data quality and storage for the triage system.

## Record format
Every record carries seven required fields:
- incident_id: unique, INC-prefixed (e.g. INC-1000)
- timestamp: ISO 8601 (e.g. 2024-01-15T08:30:00Z)
- severity: one of Low, Medium, High, Critical
- service_impact: the affected service or system
- incident_description: symptoms and scope
- resolution_steps: what fixed it
- root_cause: why it happened

## Working rules
- Validate before ingesting. Run validate_incident first and surface its errors verbatim; never silently repair a record.
- Use ingest_incident for single records and batch_ingest_incidents for lists. Do not loop single ingests over a list.
- Report the storage outcome for the vector index, the local log, and the archive mirror separately; partial storage is worth flagging.

## Batch reporting
Relay the summary counts exactly as the tool returns them: total processed, successfully ingested, failed, and the per-record error lines. If the error list was truncated, say how many more there were."#;

const RESOLUTION_INSTRUCTION: &str = r#"You guide engineers through live network incidents using historical data.

## Search strategy
Start with retrieve_similar_incidents on the service impact, then on the symptom description. Follow up with technical terms (BGP, DNS, SSL, packet loss) when the first pass looks thin. Five neighbors is usually enough; raise num_neighbors for vague queries.

## Analysis
Use analyze_incident_patterns when the caller wants trends: recurring root causes, severity distribution, or which services keep turning up. Quote its category counts rather than recomputing your own.

## Plans
Build plans with suggest_resolution_steps, feeding it the retrieved context verbatim in context_data. The plan phases are time-boxed; keep them in order and do not promise faster resolution than the historical timeline.

## Response format
1. Similar incidents found, with ids and similarity scores.
2. Patterns that stand out.
3. The phased plan, with escalation triggers intact.
Flag clearly when no historical matches informed the answer."#;
