//! HTTP API layer

pub mod endpoints;
pub mod error;
