//! Triage - Network Incident Retrieval Assistant
//!
//! Retrieval-augmented tooling for network operations: incidents are
//! validated, embedded, and mirrored to a local log plus an optional cloud
//! archive, then retrieved to drive pattern analysis and resolution plans.

pub mod agents;
pub mod cli;
pub mod clients;
pub mod config;
pub mod incident;
pub mod ingest;
pub mod patterns;
pub mod plan;
pub mod retrieve;
pub mod server;
pub mod store;
pub mod tools;
