//! Resolution plan generation. Takes retrieval context produced by the
//! retriever, pulls the resolution steps out of each matched incident, and
//! sorts their sentences into a phased action plan. Incidents with no
//! usable history fall back to stock actions per phase.

use serde_json::Value;

use crate::patterns::parse_incident_contexts;

const IMMEDIATE_KEYWORDS: &[&str] =
  &["immediate", "urgent", "first", "quickly", "emergency", "critical"];

const DIAGNOSTIC_KEYWORDS: &[&str] =
  &["check", "verify", "test", "examine", "investigate", "analyze", "diagnose"];

const RESOLUTION_KEYWORDS: &[&str] =
  &["configure", "restart", "replace", "update", "fix", "repair", "resolve"];

const VERIFICATION_KEYWORDS: &[&str] =
  &["verify", "confirm", "validate", "monitor", "test", "ensure"];

const DEFAULT_IMMEDIATE_ACTIONS: &[&str] = &[
  "Check service status and current alerts",
  "Verify critical system health indicators",
  "Assess immediate impact scope and affected users",
];

const DEFAULT_DIAGNOSTIC_STEPS: &[&str] = &[
  "Review system logs and error messages",
  "Check network connectivity and routing",
  "Verify service dependencies and integrations",
  "Test affected functionality from multiple locations",
];

const DEFAULT_RESOLUTION_ACTIONS: &[&str] = &[
  "Implement configuration changes based on root cause",
  "Restart affected services or components",
  "Apply necessary patches or updates",
  "Failover to backup systems if available",
];

const DEFAULT_VERIFICATION_STEPS: &[&str] = &[
  "Verify service functionality is fully restored",
  "Monitor system performance for stability",
  "Confirm all affected users can access services",
  "Update incident documentation and closure notes",
];

/// Build a phased resolution plan from retrieval context. `context_data`
/// is the block text returned by the retriever; `incident_details` carries
/// the incident under triage and is logged for traceability. A sentence
/// can appear in more than one phase when its keywords overlap.
pub fn suggest_resolution_steps(context_data: &str, incident_details: &Value) -> String {
  if let Some(incident_id) = incident_details.get("incident_id").and_then(Value::as_str) {
    foghorn::verbose!(&format!("Building resolution plan for {incident_id}"));
  }

  let incidents = parse_incident_contexts(context_data);
  let approaches: Vec<String> = incidents
    .iter()
    .filter_map(|incident| incident.get("resolution_steps"))
    .filter(|steps| !steps.is_empty())
    .cloned()
    .collect();

  if approaches.is_empty() {
    return "No historical resolution data available for similar incidents.".to_string();
  }

  let immediate = extract_actions(&approaches, IMMEDIATE_KEYWORDS, DEFAULT_IMMEDIATE_ACTIONS, 5);
  let diagnostic = extract_actions(&approaches, DIAGNOSTIC_KEYWORDS, DEFAULT_DIAGNOSTIC_STEPS, 5);
  let resolution = extract_actions(&approaches, RESOLUTION_KEYWORDS, DEFAULT_RESOLUTION_ACTIONS, 5);
  let verification =
    extract_actions(&approaches, VERIFICATION_KEYWORDS, DEFAULT_VERIFICATION_STEPS, 4);

  format!(
    "INCIDENT RESOLUTION PLAN\n\
     ========================\n\n\
     IMMEDIATE STABILIZATION ACTIONS (0-15 minutes):\n{}\n\n\
     DIAGNOSTIC PROCEDURES (15-30 minutes):\n{}\n\n\
     RESOLUTION IMPLEMENTATION (30+ minutes):\n{}\n\n\
     VERIFICATION AND MONITORING:\n{}\n\n\
     ESCALATION TRIGGERS:\n\
     - If stabilization actions don't reduce impact within 15 minutes\n\
     - If diagnostic steps don't identify root cause within 30 minutes\n\
     - If resolution implementation doesn't restore service within 60 minutes\n\
     - If incident affects critical business functions or multiple services\n\n\
     ROLLBACK PROCEDURES:\n\
     - Document all changes made during resolution\n\
     - Prepare rollback steps for each configuration change\n\
     - Monitor service health after each resolution step\n\
     - Have communication plan ready for extended outages\n\n\
     EXPECTED TIMELINE:\n\
     Based on similar incidents: 45-90 minutes average resolution time\n\
     Critical path: service stabilization -> root cause identification -> resolution implementation -> verification",
    format_action_list(&immediate),
    format_action_list(&diagnostic),
    format_action_list(&resolution),
    format_action_list(&verification),
  )
}

/// Pull sentences matching any of `keywords` out of the historical
/// resolution texts. Sentences split on periods; matching is
/// case-insensitive. Falls back to `defaults` when nothing matches, then
/// caps the list at `cap` entries.
fn extract_actions(
  approaches: &[String],
  keywords: &[&str],
  defaults: &[&str],
  cap: usize,
) -> Vec<String> {
  let mut actions = Vec::new();
  for approach in approaches {
    for sentence in approach.split('.') {
      let sentence = sentence.trim();
      if sentence.is_empty() {
        continue;
      }
      let lowered = sentence.to_lowercase();
      if keywords.iter().any(|keyword| lowered.contains(keyword)) {
        actions.push(sentence.to_string());
      }
    }
  }

  if actions.is_empty() {
    actions = defaults.iter().map(|step| step.to_string()).collect();
  }
  actions.truncate(cap);
  actions
}

fn format_action_list(actions: &[String]) -> String {
  if actions.is_empty() {
    return "No specific actions identified".to_string();
  }
  actions
    .iter()
    .enumerate()
    .map(|(position, action)| format!("{}. {}", position + 1, action))
    .collect::<Vec<_>>()
    .join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn context_with_resolution(id: &str, resolution: &str) -> String {
    format!(
      "=== Similar Incident 1 (Similarity: 0.102) ===\n\
       Incident ID: {id} | Severity: High | Service Impact: Transit degraded | \
       Description: Link flap | Resolution Steps: {resolution} | \
       Root Cause: Fiber cut | Timestamp: 2024-01-15T08:30:00Z"
    )
  }

  #[test]
  fn no_history_returns_placeholder() {
    let plan = suggest_resolution_steps("", &json!({}));
    assert_eq!(plan, "No historical resolution data available for similar incidents.");

    let plan = suggest_resolution_steps(crate::retrieve::NO_MATCHES, &json!({}));
    assert_eq!(plan, "No historical resolution data available for similar incidents.");
  }

  #[test]
  fn sentences_route_to_matching_phases() {
    let context = context_with_resolution(
      "INC-2001",
      "First isolate the failing link. Check BGP session state. Restart the affected router",
    );
    let plan = suggest_resolution_steps(&context, &json!({"incident_id": "INC-2001"}));

    assert!(plan.contains("IMMEDIATE STABILIZATION ACTIONS (0-15 minutes):\n1. First isolate the failing link"));
    assert!(plan.contains("DIAGNOSTIC PROCEDURES (15-30 minutes):\n1. Check BGP session state"));
    assert!(plan.contains("RESOLUTION IMPLEMENTATION (30+ minutes):\n1. Restart the affected router"));
  }

  #[test]
  fn sentence_can_land_in_several_phases() {
    let context = context_with_resolution("INC-2002", "Verify the rollback completed");
    let plan = suggest_resolution_steps(&context, &json!({}));

    let occurrences = plan.matches("Verify the rollback completed").count();
    // "verify" is both a diagnostic and a verification keyword.
    assert_eq!(occurrences, 2);
  }

  #[test]
  fn unmatched_history_falls_back_to_defaults() {
    let context = context_with_resolution("INC-2003", "Waited for the storm to pass");
    let plan = suggest_resolution_steps(&context, &json!({}));

    assert!(plan.contains("1. Check service status and current alerts"));
    assert!(plan.contains("1. Review system logs and error messages"));
    assert!(plan.contains("1. Implement configuration changes based on root cause"));
    assert!(plan.contains("1. Verify service functionality is fully restored"));
  }

  #[test]
  fn phases_cap_their_action_counts() {
    let resolution = "Check alpha. Check bravo. Check charlie. Check delta. Check echo. Check foxtrot";
    let context = context_with_resolution("INC-2004", resolution);
    let plan = suggest_resolution_steps(&context, &json!({}));

    assert!(plan.contains("5. Check echo"));
    assert!(!plan.contains("Check foxtrot"));
  }

  #[test]
  fn plan_carries_fixed_guidance_sections() {
    let context = context_with_resolution("INC-2005", "Restart the router");
    let plan = suggest_resolution_steps(&context, &json!({}));

    assert!(plan.contains("ESCALATION TRIGGERS:"));
    assert!(plan.contains("- If incident affects critical business functions or multiple services"));
    assert!(plan.contains("ROLLBACK PROCEDURES:"));
    assert!(plan.contains("- Document all changes made during resolution"));
    assert!(plan.contains("EXPECTED TIMELINE:"));
    assert!(plan.contains("45-90 minutes average resolution time"));
  }

  #[test]
  fn verification_phase_caps_at_four() {
    let resolution =
      "Monitor alpha. Monitor bravo. Monitor charlie. Monitor delta. Monitor echo";
    let context = context_with_resolution("INC-2006", resolution);
    let plan = suggest_resolution_steps(&context, &json!({}));

    let verification = plan
      .split("VERIFICATION AND MONITORING:\n")
      .nth(1)
      .and_then(|section| section.split("\n\n").next())
      .unwrap_or("");
    assert!(verification.contains("4. Monitor delta"));
    assert!(!verification.contains("Monitor echo"));
  }
}
