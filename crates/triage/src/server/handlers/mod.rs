//! Endpoint handlers

pub mod agents;
pub mod logs;
pub mod status;
pub mod tools;
