//! Utility modules shared across the server.

pub mod exec;
pub mod mime;
