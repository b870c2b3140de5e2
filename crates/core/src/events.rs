//! The worker → supervisor event channel (spec §4.6).
//!
//! Grounded directly in the original agent's `AgentToParentMessage`
//! discriminated union, which traveled over a `multiprocessing.Pipe`. Here
//! it travels over a `tokio::sync::mpsc::UnboundedSender<WorkerEvent>`
//! instead, with `SessionCommand` going the other way.

use serde_json::Value;

/// Emitted by an agent worker task as it runs a single heartbeat turn.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    /// A raw assistant/tool message, forwarded for logging or replay.
    Message(Value),
    /// Internal diagnostic detail (model reasoning, retry attempts).
    Debug(String),
    /// A recoverable problem the supervisor should log but not act on.
    Error(String),
    /// The text the `send_message` tool wants shown to the end user.
    ToUser(String),
    /// The worker has stopped running and the per-agent lock can be
    /// released. Always the last event a worker emits.
    Halt,
    /// A keepalive emitted around a long-running step (an LLM call) so the
    /// session channel doesn't look dead while no content is flowing.
    Ping,
}

/// Sent by the supervisor into a running worker's command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Stop after the current tool call completes, without another
    /// heartbeat iteration.
    Halt,
    /// Finish the current turn, but do not begin another one even if
    /// `do_heartbeat` was set.
    HaltSoon,
}
