//! Core types and traits for the hearth agent runtime.
//!
//! This crate has no I/O of its own. It defines the message/content model
//! (spec §3), the shared error taxonomy (spec §7), the narrow interfaces the
//! core depends on for LLM inference, tokenization and storage (spec §6),
//! and the typed events exchanged between an agent worker and its
//! supervisor (spec §4.6).

pub mod error;
pub mod events;
pub mod message;
pub mod traits;

pub use error::Error;
pub use events::{SessionCommand, WorkerEvent};
pub use message::{
    AssistantContent, FunctionCall, FunctionResultContent, Message, MessageContent, MessageKind,
    TextContent,
};
pub use traits::{
    AgentRow, ArchivalFragment, ArchivalHit, ChatLogRow, ChatTurn, LanguageModel, RelationalStore,
    Tokenizer, VectorStore,
};

/// An agent's identity. A thin alias over `Uuid` kept distinct so callers
/// don't confuse it with other identifiers flowing through the system.
pub type AgentId = uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;
