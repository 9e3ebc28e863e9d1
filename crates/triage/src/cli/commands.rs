use std::io::Read;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use colored::*;

use crate::agents;
use crate::config::TriageConfig;
use crate::incident::IncidentRecord;
use crate::patterns::analyze_incident_patterns;
use crate::plan::suggest_resolution_steps;
use crate::retrieve::DEFAULT_NEIGHBORS;
use crate::store::IncidentLog;
use crate::tools::Toolbox;

/// Validate an incident record without touching any backing service
pub async fn validate_file(file: &str) -> Result<()> {
  let record = read_record(file)?;
  let status = record.validation_status();

  if status == "VALID" {
    println!("{} {}", "✓".green(), status.green());
  } else {
    println!("{} {}", "✗".red(), status.red());
  }

  Ok(())
}

/// Ingest a single incident against the configured services
pub async fn ingest_file(file: &str) -> Result<()> {
  let record = read_record(file)?;
  let toolbox = Toolbox::from_config(&TriageConfig::from_env()?)?;

  let status = toolbox.ingestor().ingest_incident(&record).await;
  println!("{status}");

  Ok(())
}

/// Ingest a batch of incidents from a JSONL file or a JSON array
pub async fn batch_file(file: &str) -> Result<()> {
  let raw = read_input(file)?;
  let records = parse_batch(&raw)?;
  let toolbox = Toolbox::from_config(&TriageConfig::from_env()?)?;

  let summary = toolbox.ingestor().batch_ingest(&records).await;
  println!("{summary}");

  Ok(())
}

/// Retrieve incidents similar to a free-text query
pub async fn search(query: &str, neighbors: usize) -> Result<()> {
  let toolbox = Toolbox::from_config(&TriageConfig::from_env()?)?;

  let context = toolbox.retriever().retrieve_context(query, neighbors).await;
  println!("{context}");

  Ok(())
}

/// Report historical patterns matching an incident description
pub async fn analyze(description: &str, service_impact: &str) -> Result<()> {
  let toolbox = Toolbox::from_config(&TriageConfig::from_env()?)?;

  let report = analyze_incident_patterns(toolbox.retriever(), description, service_impact).await;
  println!("{report}");

  Ok(())
}

/// Build a resolution plan from historical context
///
/// Context comes from `--context-file` when given, otherwise from a fresh
/// retrieval using the incident description as the query.
pub async fn plan(incident: &str, context_file: Option<&str>) -> Result<()> {
  let context = match context_file {
    Some(path) => read_input(path)?,
    None => {
      let toolbox = Toolbox::from_config(&TriageConfig::from_env()?)?;
      toolbox.retriever().retrieve_context(incident, DEFAULT_NEIGHBORS).await
    }
  };

  let details = serde_json::json!({ "description": incident });
  println!("{}", suggest_resolution_steps(&context, &details));

  Ok(())
}

/// List the agent manifests exposed to the LLM runtime
pub fn show_agents() -> Result<()> {
  for manifest in agents::registry() {
    println!("{} {} ({})", "🤖".cyan(), manifest.display_name.bold(), manifest.name.blue());
    println!("  {}", manifest.description.dimmed());

    if !manifest.tools.is_empty() {
      let names: Vec<&str> = manifest.tools.iter().map(|tool| tool.name).collect();
      println!("  tools: {}", names.join(", ").yellow());
    }
    if !manifest.sub_agents.is_empty() {
      println!("  sub-agents: {}", manifest.sub_agents.join(", ").cyan());
    }

    if let Some(line) = manifest.instruction.lines().find(|line| !line.trim().is_empty()) {
      println!("  {}", line.trim().dimmed());
    }
    println!();
  }

  Ok(())
}

/// Summarize the local incident log
pub fn stats() -> Result<()> {
  let config = TriageConfig::from_env()?;
  let log = IncidentLog::new(config.log_file.clone());
  let count = log.count()?;

  if count == 0 {
    println!("No incidents recorded in {}", config.log_file.display());
    return Ok(());
  }

  println!(
    "{} {} incidents in {}",
    "📊".cyan(),
    count.to_string().bold(),
    config.log_file.display()
  );

  println!("\n{}", "By severity:".blue().bold());
  for (severity, count) in log.severity_tallies()? {
    println!("  {} {}", format!("{count:>4}").yellow(), severity);
  }

  println!("\n{}", "By service impact:".blue().bold());
  for (impact, count) in log.service_tallies()? {
    println!("  {} {}", format!("{count:>4}").yellow(), impact);
  }

  Ok(())
}

/// Start the HTTP tool server
pub async fn serve(host: &str, port: u16) -> Result<()> {
  use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("triage=info,warn"));
  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  let config = TriageConfig::from_env()?;
  let addr: SocketAddr = format!("{host}:{port}")
    .parse()
    .with_context(|| format!("invalid bind address {host}:{port}"))?;

  crate::server::start_server(config, addr).await
}

fn read_input(file: &str) -> Result<String> {
  if file == "-" {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer).context("failed to read from stdin")?;
    Ok(buffer)
  } else {
    std::fs::read_to_string(file).with_context(|| format!("failed to read {file}"))
  }
}

fn read_record(file: &str) -> Result<IncidentRecord> {
  let raw = read_input(file)?;
  serde_json::from_str(&raw).context("input is not a JSON incident record")
}

/// Accept either a JSON array of records or one JSON record per line
fn parse_batch(raw: &str) -> Result<Vec<IncidentRecord>> {
  if raw.trim_start().starts_with('[') {
    return serde_json::from_str(raw).context("input is not a JSON array of incident records");
  }

  let mut records = Vec::new();
  for (number, line) in raw.lines().enumerate() {
    if line.trim().is_empty() {
      continue;
    }
    let record: IncidentRecord = serde_json::from_str(line)
      .with_context(|| format!("line {} is not a JSON incident record", number + 1))?;
    records.push(record);
  }
  Ok(records)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn batch_parses_json_array() {
    let raw = r#"[
      {"incident_id": "INC-1", "severity": "Low", "incident_description": "a",
       "resolution_steps": "b", "service_impact": "c", "root_cause": "d",
       "timestamp": "2024-08-20T10:00:00Z"}
    ]"#;

    let records = parse_batch(raw).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].incident_id, "INC-1");
  }

  #[test]
  fn batch_parses_jsonl_and_skips_blank_lines() {
    let raw = concat!(
      r#"{"incident_id": "INC-1", "severity": "Low", "incident_description": "a", "resolution_steps": "b", "service_impact": "c", "root_cause": "d", "timestamp": "2024-08-20T10:00:00Z"}"#,
      "\n\n",
      r#"{"incident_id": "INC-2", "severity": "High", "incident_description": "a", "resolution_steps": "b", "service_impact": "c", "root_cause": "d", "timestamp": "2024-08-21T10:00:00Z"}"#,
      "\n",
    );

    let records = parse_batch(raw).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].incident_id, "INC-2");
  }

  #[test]
  fn batch_reports_offending_line() {
    let raw = "{\"incident_id\": \"INC-1\"}\nnot json\n";

    let err = parse_batch(raw).unwrap_err();
    assert!(err.to_string().contains("line 2"));
  }
}
