//! Command-line interface for the triage assistant
//!
//! Commands run directly against the configured services; `serve` exposes
//! the same tools over HTTP for the agent runtime.

pub mod commands;
