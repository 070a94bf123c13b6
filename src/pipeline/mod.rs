//! Request pipeline
//!
//! Turns one compare request into per-provider answers: the use-case
//! builder shapes the prompt for a single provider, the fan-out runs that
//! flow for every selected provider and merges the results.

pub mod fan_out;
pub mod use_case;

pub use fan_out::fan_out;
pub use use_case::UseCaseInput;
