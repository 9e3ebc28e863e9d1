//! REST surface for the triage tools
//!
//! Exposes the tool functions, agent manifests, and the shared journal over
//! HTTP so an external agent runtime (or an operator with curl) can drive
//! them. Uses axum for routing and schemars-annotated types throughout.

pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod server;
pub mod types;

pub use routing::{create_router, AppState};
pub use server::start_server;
