//! Runtime configuration, tunable constants and prompt templates for the
//! hearth agent runtime (spec §2's ambient configuration layer).
//!
//! Nothing here talks to a database or a model; this crate only turns
//! environment variables into a typed, validated [`RuntimeConfig`] once at
//! startup, and holds the prompt text and named constants that the rest of
//! the workspace reads by value.

pub mod constants;
pub mod error;
pub mod prompts;
pub mod runtime;

pub use error::ConfigError;
pub use runtime::RuntimeConfig;
