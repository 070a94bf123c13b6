//! API data models
//!
//! This module contains the browser-facing request/response types and the
//! wire formats of the three provider backends.

pub mod anthropic;
pub mod compare;
pub mod ollama;
pub mod openai;
