//! Error taxonomy shared across the hearth workspace.
//!
//! Kinds are grouped by cause, not by source-language type, matching the
//! propagation policy: tool errors stay local, schema errors retry inside
//! the node that raised them, backend errors retry inside the LLM wrapper,
//! and anything else escapes as a run-terminating `Fatal`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// LLM, vector store or relational store unavailable, or returned an
    /// empty/unusable response. Retried at the call site; bubbles up once
    /// retries are exhausted.
    #[error("backend failure: {0}")]
    BackendFailure(String),

    /// An assistant turn failed schema validation, a tool's arguments
    /// didn't validate, or a persona write exceeded the word cap.
    #[error("validation failure: {0}")]
    ValidationFailure(String),

    /// A tool raised while executing. Always converted to a failed
    /// function-result message; never halts the run on its own.
    #[error("tool failure: {0}")]
    ToolFailure(String),

    /// Caller asked for something that doesn't exist (unknown agent, pop
    /// on an empty queue, peek on an empty FIFO).
    #[error("missing resource: {0}")]
    MissingResource(String),

    /// A control command arrived that isn't `halt` or `halt_soon`.
    #[error("control violation: {0}")]
    ControlViolation(String),

    /// Unrecoverable: DB down after retries, worker panicked. The worker
    /// emits `error` then `halt`; the supervisor releases the lock.
    #[error("fatal: {0}")]
    Fatal(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailure(msg.into())
    }

    pub fn missing(msg: impl Into<String>) -> Self {
        Self::MissingResource(msg.into())
    }
}
