use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use serial_test::serial;
use std::process::Command;

/// Helper to create a Command for the `triage` binary with the incident
/// log redirected into a temporary directory.
fn triage_cmd(temp: &assert_fs::TempDir) -> Command {
  let mut cmd = Command::cargo_bin("triage").expect("binary exists");
  cmd.env("TRIAGE_LOG_FILE", temp.path().join("incidents.jsonl"));
  cmd
}

const VALID_RECORD: &str = r#"{
  "incident_id": "INC-2000",
  "timestamp": "2024-08-20T10:00:00Z",
  "severity": "High",
  "service_impact": "4G Service Outage",
  "incident_description": "Outage in the metro area",
  "resolution_steps": "Restarted the radio units",
  "root_cause": "Power fault at the site"
}"#;

#[test]
#[serial]
fn test_validate_file_and_stdin() {
  let temp = assert_fs::TempDir::new().unwrap();

  let file = temp.child("incident.json");
  file.write_str(VALID_RECORD).unwrap();

  triage_cmd(&temp)
    .args(["validate", "--file", file.path().to_str().unwrap()])
    .assert()
    .success()
    .stdout(contains("VALID"));

  triage_cmd(&temp)
    .args(["validate", "--file", "-"])
    .write_stdin(VALID_RECORD)
    .assert()
    .success()
    .stdout(contains("VALID"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_validate_reports_violations_without_failing() {
  let temp = assert_fs::TempDir::new().unwrap();

  let file = temp.child("broken.json");
  file.write_str(r#"{"incident_id": "2024-1", "severity": "Huge"}"#).unwrap();

  triage_cmd(&temp)
    .args(["validate", "--file", file.path().to_str().unwrap()])
    .assert()
    .success()
    .stdout(
      contains("Missing or empty required field: timestamp")
        .and(contains("Invalid severity level"))
        .and(contains("Incident ID should follow format: INC-XXXX")),
    );

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_validate_unreadable_file_fails() {
  let temp = assert_fs::TempDir::new().unwrap();

  triage_cmd(&temp)
    .args(["validate", "--file", "does-not-exist.json"])
    .assert()
    .failure()
    .stderr(contains("failed to read does-not-exist.json"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_plan_from_context_file() {
  let temp = assert_fs::TempDir::new().unwrap();

  let context = temp.child("context.txt");
  context
    .write_str(
      "=== Similar Incident 1 (Similarity: 0.120) ===\n\
       Incident ID: INC-2100 | Severity: High | Service Impact: Transit | \
       Description: Link flap | Resolution Steps: Restarted the line card. \
       Verified traffic recovery. | Root Cause: Hardware fault | \
       Timestamp: 2024-08-20T10:00:00Z",
    )
    .unwrap();

  triage_cmd(&temp)
    .args(["plan", "--incident", "Transit link flapping", "--context-file"])
    .arg(context.path())
    .assert()
    .success()
    .stdout(
      contains("INCIDENT RESOLUTION PLAN")
        .and(contains("IMMEDIATE STABILIZATION ACTIONS"))
        .and(contains("ESCALATION TRIGGERS")),
    );

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_plan_with_empty_history() {
  let temp = assert_fs::TempDir::new().unwrap();

  let context = temp.child("empty.txt");
  context.write_str("No similar incidents found in the database.").unwrap();

  triage_cmd(&temp)
    .args(["plan", "--incident", "Unknown anomaly", "--context-file"])
    .arg(context.path())
    .assert()
    .success()
    .stdout(contains("No historical resolution data available for similar incidents."));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_agents_lists_manifests() {
  let temp = assert_fs::TempDir::new().unwrap();

  triage_cmd(&temp)
    .args(["agents"])
    .assert()
    .success()
    .stdout(
      contains("triage.coordinator")
        .and(contains("triage.ingestion"))
        .and(contains("triage.resolution"))
        .and(contains("validate_incident"))
        .and(contains("suggest_resolution_steps")),
    );

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_stats_on_empty_log() {
  let temp = assert_fs::TempDir::new().unwrap();

  triage_cmd(&temp)
    .args(["stats"])
    .assert()
    .success()
    .stdout(contains("No incidents recorded"));

  temp.close().unwrap();
}

#[test]
#[serial]
fn test_stats_tallies_severity_and_impact() {
  let temp = assert_fs::TempDir::new().unwrap();

  let line = |id: &str, severity: &str, impact: &str| {
    format!(
      r#"{{"id":"{id}","text":"Incident ID: INC-{id}","metadata":{{"severity":"{severity}","service_impact":"{impact}","timestamp":"2024-08-20T10:00:00Z","ingestion_time":"2024-08-21T09:00:00Z","original_id":"INC-{id}"}}}}"#
    )
  };
  let log = temp.child("incidents.jsonl");
  log
    .write_str(&format!(
      "{}\n{}\n{}\n",
      line("2200", "High", "4G Service Outage"),
      line("2201", "High", "DNS Degradation"),
      line("2202", "Critical", "4G Service Outage"),
    ))
    .unwrap();

  triage_cmd(&temp)
    .args(["stats"])
    .assert()
    .success()
    .stdout(
      contains("3 incidents")
        .and(contains("By severity:"))
        .and(contains("High"))
        .and(contains("Critical"))
        .and(contains("By service impact:"))
        .and(contains("4G Service Outage")),
    );

  temp.close().unwrap();
}
