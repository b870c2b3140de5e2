//! The seams between the core agent logic and its backends (spec §6).
//!
//! Everything in this module is a narrow trait plus the data it moves.
//! Implementations live in `hearth-llm`, `hearth-rag` and
//! `hearth-persistence`; `hearth-agent` depends only on these traits so
//! it can be exercised against in-memory fakes in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::message::Message;
use crate::{AgentId, Result};

/// A single role/content pair as sent to a chat-completions style API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: role.into(), content: content.into() }
    }
}

/// A chat-completions backend. Implementations own their own retry/failover
/// policy across backends and models (spec §4.2); this trait is the single
/// call a retried attempt makes.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Runs one completion over `messages` and returns the raw assistant
    /// text. Must error rather than return empty content.
    async fn complete(&self, messages: &[ChatTurn]) -> Result<String>;
}

/// Counts tokens the way the configured model would, so the context
/// assembler and recursive summarizer can reason about the context window
/// budget (spec §4.3's `CTX_WINDOW`/`WARN_FRAC`/`FLUSH_FRAC` thresholds).
pub trait Tokenizer: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
}

/// One chunk of archival text, ready to be embedded and stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivalFragment {
    pub text: String,
    pub category: Option<String>,
}

/// One hit returned from an archival similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivalHit {
    pub id: String,
    pub text: String,
    pub category: Option<String>,
    pub inserted_at: DateTime<Utc>,
    pub score: f32,
}

/// Per-agent vector collection backing Archival Storage (spec §4.1).
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn ensure_collection(&self, agent_id: AgentId) -> Result<()>;

    async fn insert(&self, agent_id: AgentId, fragments: Vec<ArchivalFragment>) -> Result<Vec<String>>;

    async fn search(
        &self,
        agent_id: AgentId,
        query: &str,
        category: Option<&str>,
        offset: usize,
        count: usize,
    ) -> Result<Vec<ArchivalHit>>;

    async fn drop_collection(&self, agent_id: AgentId) -> Result<()>;
}

/// A stored agent's relational row (spec §3's `agents` table).
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRow {
    pub id: AgentId,
    pub optional_tool_sets: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub recursive_summary: String,
    pub recursive_summary_update_time: DateTime<Utc>,
}

/// One row as returned from a Chat Log search (spec §4.1's Chat Log tier).
#[derive(Debug, Clone, PartialEq)]
pub struct ChatLogRow {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub from_assistant: bool,
}

/// The relational backing store: `agents`, `working_context`,
/// `recall_storage`, `fifo_queue` and `chat_log` (spec §3). One trait
/// covers all five tables since they share a lifecycle (per-agent rows,
/// created together, dropped together) and a single ScyllaDB session in
/// `hearth-persistence` backs all of them.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    async fn create_agent(&self, optional_tool_sets: Vec<String>) -> Result<AgentRow>;
    async fn get_agent(&self, id: AgentId) -> Result<AgentRow>;
    async fn list_agents(&self) -> Result<Vec<AgentRow>>;
    async fn delete_agent(&self, id: AgentId) -> Result<()>;
    async fn update_recursive_summary(&self, id: AgentId, summary: &str) -> Result<()>;

    async fn get_agent_persona(&self, id: AgentId) -> Result<String>;
    async fn get_user_persona(&self, id: AgentId) -> Result<String>;
    async fn set_agent_persona(&self, id: AgentId, persona: &str) -> Result<()>;
    async fn set_user_persona(&self, id: AgentId, persona: &str) -> Result<()>;
    async fn get_tasks(&self, id: AgentId) -> Result<Vec<String>>;
    async fn push_task(&self, id: AgentId, task: &str) -> Result<()>;
    async fn pop_task(&self, id: AgentId) -> Result<String>;

    async fn append_recall(&self, id: AgentId, message: &Message) -> Result<()>;
    async fn search_recall(&self, id: AgentId, query: &str, page: usize) -> Result<Vec<Message>>;
    async fn search_recall_by_date(
        &self,
        id: AgentId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: usize,
    ) -> Result<Vec<Message>>;

    async fn push_fifo(&self, id: AgentId, message: &Message) -> Result<()>;
    async fn peek_fifo(&self, id: AgentId) -> Result<Message>;
    async fn pop_fifo(&self, id: AgentId) -> Result<Message>;
    async fn fifo_len(&self, id: AgentId) -> Result<usize>;
    async fn fifo_messages(&self, id: AgentId) -> Result<Vec<Message>>;

    async fn append_chat_log(&self, id: AgentId, message: &str, from_assistant: bool) -> Result<()>;
    async fn search_chat_log(&self, id: AgentId, query: &str, page: usize) -> Result<Vec<ChatLogRow>>;
    async fn search_chat_log_by_date(
        &self,
        id: AgentId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: usize,
    ) -> Result<Vec<ChatLogRow>>;
}

/// A JSON value carried by a tool-call argument map, re-exported here so
/// `hearth-tools` doesn't need its own alias for the same thing core's
/// traits already move around.
pub type ToolArguments = Value;
