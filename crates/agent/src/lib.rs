//! Memory tiers, context assembly, recursive summarization, persona
//! drafting and the heartbeat control loop for one agent (spec §4).
//!
//! This crate has no knowledge of HTTP, WebSockets or process supervision
//! — that's `hearth-server`'s job. It only knows how to run one agent's
//! heartbeat loop to completion given a [`hearth_core::traits::RelationalStore`],
//! a [`hearth_core::traits::LanguageModel`] and a [`hearth_tools::ToolRegistry`].

pub mod error;
pub mod heartbeat;
pub mod memory;
pub mod persona;
pub mod summarizer;
pub mod worker;

pub use error::AgentError;
pub use heartbeat::HeartbeatConfig;
pub use memory::AgentMemory;
