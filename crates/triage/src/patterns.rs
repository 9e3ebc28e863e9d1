//! Pattern analysis over previously ingested incidents. Runs a handful of
//! retrieval queries derived from the incident under triage, parses the
//! returned context blocks back into field maps, and tallies what recurs.

use std::collections::HashMap;

use crate::retrieve::Retriever;

/// Terms worth searching on when they appear in an incident description.
/// Checked case-insensitively, in order; the first three hits become
/// extra retrieval queries.
const TECHNICAL_TERMS: &[&str] = &[
  "BGP",
  "DNS",
  "router",
  "switch",
  "fiber",
  "authentication",
  "SSL",
  "certificate",
  "packet loss",
  "latency",
  "timeout",
  "connection",
  "service",
  "outage",
  "failure",
  "performance",
  "degradation",
  "error",
  "down",
  "unavailable",
];

/// Root cause buckets. A cause lands in the first bucket whose keyword
/// list matches, so order matters.
const ROOT_CAUSE_CATEGORIES: &[(&str, &[&str])] = &[
  ("Hardware", &["hardware", "router", "switch", "server", "equipment", "power"]),
  ("Network", &["routing", "bgp", "dns", "connectivity", "network", "fiber"]),
  ("Software", &["software", "bug", "application", "service", "process"]),
  ("Configuration", &["configuration", "config", "setting", "parameter"]),
  ("Capacity", &["capacity", "overload", "congestion", "bandwidth", "resource"]),
  ("Security", &["security", "certificate", "authentication", "ssl", "expired"]),
  ("External", &["external", "provider", "third-party", "construction", "weather"]),
];

/// Resolution action buckets. Unlike root causes, one resolution text can
/// count toward several buckets at once.
const RESOLUTION_ACTION_TYPES: &[(&str, &[&str])] = &[
  ("Restart", &["restart", "reboot", "reload", "reset"]),
  ("Configuration", &["configure", "setting", "parameter", "config"]),
  ("Replacement", &["replace", "swap", "change hardware", "new equipment"]),
  ("Routing", &["routing", "bgp", "route", "failover"]),
  ("Certificate", &["certificate", "ssl", "renew", "update cert"]),
  ("Monitoring", &["monitor", "check", "verify", "test", "validate"]),
  ("Escalation", &["escalate", "specialist", "vendor", "support"]),
  ("Communication", &["communicate", "notify", "inform", "announce"]),
];

/// How many entries a tally section shows
const TALLY_DISPLAY_LIMIT: usize = 5;

/// Neighbors fetched per pattern query
const NEIGHBORS_PER_QUERY: usize = 5;

/// Cross-incident pattern report for the given description and impact.
/// Issues several retrieval queries, drops responses that came back as
/// errors, and tallies severity, service impact, root causes, and
/// resolution approaches across everything that parsed.
pub async fn analyze_incident_patterns(
  retriever: &Retriever,
  incident_description: &str,
  service_impact: &str,
) -> String {
  let queries = build_search_queries(incident_description, service_impact);

  let mut contexts = Vec::new();
  for query in &queries {
    let context = retriever.retrieve_context(query, NEIGHBORS_PER_QUERY).await;
    if !context.is_empty() && !context.contains("Error") {
      contexts.push(context);
    }
  }

  if contexts.is_empty() {
    return "No similar incident patterns found for analysis.".to_string();
  }

  let mut incidents = Vec::new();
  for context in &contexts {
    incidents.extend(parse_incident_contexts(context));
  }

  foghorn::verbose!(&format!(
    "Pattern analysis parsed {} incidents from {} contexts",
    incidents.len(),
    contexts.len()
  ));

  let mut severities = Tally::default();
  let mut services = Tally::default();
  let mut root_causes = Vec::new();
  let mut resolutions = Vec::new();

  for incident in &incidents {
    severities.add(field_or_unknown(incident, "severity"));
    services.add(field_or_unknown(incident, "service_impact"));
    if let Some(cause) = incident.get("root_cause").filter(|value| !value.is_empty()) {
      root_causes.push(cause.clone());
    }
    if let Some(steps) = incident.get("resolution_steps").filter(|value| !value.is_empty()) {
      resolutions.push(steps.clone());
    }
  }

  format!(
    "INCIDENT PATTERN ANALYSIS\n\
     ========================\n\n\
     Service Impact Patterns:\n{}\n\n\
     Severity Distribution:\n{}\n\n\
     Common Root Causes:\n{}\n\n\
     Effective Resolution Approaches:\n{}\n\n\
     RECOMMENDATIONS:\n\
     - Focus on the most common root causes identified above\n\
     - Use resolution approaches that have proven successful for similar incidents\n\
     - Consider the typical severity progression for this service impact type\n\
     - Prepare escalation procedures based on historical patterns",
    format_tally(services, TALLY_DISPLAY_LIMIT),
    format_tally(severities, TALLY_DISPLAY_LIMIT),
    summarize_root_causes(&root_causes),
    summarize_resolution_approaches(&resolutions),
  )
}

/// Queries to run for a pattern analysis: the impact, the description,
/// both combined, then technical terms pulled from the description.
/// Capped at five total.
fn build_search_queries(incident_description: &str, service_impact: &str) -> Vec<String> {
  let mut queries = vec![
    service_impact.to_string(),
    incident_description.to_string(),
    format!("{service_impact} {incident_description}"),
  ];
  for term in extract_technical_terms(incident_description) {
    queries.push(term.to_string());
  }
  queries.truncate(5);
  queries
}

/// First three entries of `TECHNICAL_TERMS` found in the text,
/// case-insensitively, in table order.
fn extract_technical_terms(text: &str) -> Vec<&'static str> {
  let lowered = text.to_lowercase();
  let mut found = Vec::new();
  for term in TECHNICAL_TERMS {
    if lowered.contains(&term.to_lowercase()) {
      found.push(*term);
      if found.len() == 3 {
        break;
      }
    }
  }
  found
}

/// Split a retrieval response back into per-incident field maps. Blocks
/// that do not carry an `Incident ID:` field (for example the no-matches
/// message) are dropped.
pub(crate) fn parse_incident_contexts(context: &str) -> Vec<HashMap<String, String>> {
  context
    .split("=== Similar Incident")
    .filter(|block| block.contains("Incident ID:"))
    .map(parse_incident_block)
    .collect()
}

/// Parse one block of composed incident text into a field map. Keys are
/// lowercased with spaces replaced by underscores, so "Service Impact"
/// becomes `service_impact`.
fn parse_incident_block(block: &str) -> HashMap<String, String> {
  // After the split, a block opens with the tail of its result banner,
  // e.g. " 1 (Similarity: 0.482) ===". Skip past it so the first field
  // parses as incident_id instead of banner text.
  let body = match block.find("===") {
    Some(position) => &block[position + 3..],
    None => block,
  };

  let mut fields = HashMap::new();
  for piece in body.split(" | ") {
    if let Some((key, value)) = piece.split_once(':') {
      let key = key.trim().to_lowercase().replace(' ', "_");
      fields.insert(key, value.trim().to_string());
    }
  }
  fields
}

fn field_or_unknown<'a>(incident: &'a HashMap<String, String>, key: &str) -> &'a str {
  incident.get(key).map(String::as_str).unwrap_or("Unknown")
}

/// Bucket root causes into categories and render the counts, most common
/// first. Each cause counts toward at most one category.
fn summarize_root_causes(root_causes: &[String]) -> String {
  if root_causes.is_empty() {
    return "No root cause data available".to_string();
  }

  let mut tally = Tally::default();
  for cause in root_causes {
    let lowered = cause.to_lowercase();
    for (category, keywords) in ROOT_CAUSE_CATEGORIES {
      if keywords.iter().any(|keyword| lowered.contains(keyword)) {
        tally.add(category);
        break;
      }
    }
  }

  if tally.is_empty() {
    return "No clear root cause patterns identified".to_string();
  }
  render_counts(tally.ranked())
}

/// Bucket resolution texts into action types and render the counts. One
/// text can count toward several action types.
fn summarize_resolution_approaches(resolutions: &[String]) -> String {
  if resolutions.is_empty() {
    return "No resolution data available".to_string();
  }

  let mut tally = Tally::default();
  for steps in resolutions {
    let lowered = steps.to_lowercase();
    for (action, keywords) in RESOLUTION_ACTION_TYPES {
      if keywords.iter().any(|keyword| lowered.contains(keyword)) {
        tally.add(action);
      }
    }
  }

  if tally.is_empty() {
    return "No clear resolution patterns identified".to_string();
  }
  render_counts(tally.ranked())
}

fn format_tally(tally: Tally, limit: usize) -> String {
  if tally.is_empty() {
    return "No data available".to_string();
  }
  let mut ranked = tally.ranked();
  ranked.truncate(limit);
  render_counts(ranked)
}

fn render_counts(entries: Vec<(String, usize)>) -> String {
  entries
    .iter()
    .map(|(name, count)| format!("- {name}: {count} incidents"))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Occurrence counter that remembers first-seen order, so ties in the
/// ranked output stay in the order the values first appeared.
#[derive(Default)]
struct Tally {
  entries: Vec<(String, usize)>,
}

impl Tally {
  fn add(&mut self, key: &str) {
    match self.entries.iter_mut().find(|(name, _)| name == key) {
      Some(entry) => entry.1 += 1,
      None => self.entries.push((key.to_string(), 1)),
    }
  }

  fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  fn ranked(mut self) -> Vec<(String, usize)> {
    self.entries.sort_by(|a, b| b.1.cmp(&a.1));
    self.entries
  }
}
