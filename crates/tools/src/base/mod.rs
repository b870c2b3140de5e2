//! The always-present tool set (spec §4.4), grounded in the original's
//! `function_sets/base/` package: persona/task editing over Working
//! Context, Recall/Archival/Chat Log search, and sending a message to
//! the user.

pub mod archival_storage;
pub mod chat_log;
pub mod general;
pub mod recall_storage;
pub mod working_context;

use std::sync::Arc;

use hearth_core::traits::{RelationalStore, Tokenizer, VectorStore};
use hearth_core::AgentId;
use tokio::sync::mpsc::UnboundedSender;

use crate::tool::Tool;
use archival_storage::{ArchivalInsertTool, ArchivalSearchTool};
use chat_log::{ChatLogSearchByDateTool, ChatLogSearchTool};
use general::SendMessageTool;
use recall_storage::{RecallSearchByDateTool, RecallSearchTool};
use working_context::{PersonaAppendTool, PersonaReplaceTool, PopTaskTool, PushTaskTool};

/// Builds the base tool set for one agent. `chunk_max_tokens` bounds
/// `archival_insert`'s chunk splitting (spec §4.3's `CHUNK_MAX_TOKENS`);
/// `persona_max_words` bounds `persona_append`/`persona_replace` (spec
/// §4.3's `PERSONA_MAX_WORDS`).
#[allow(clippy::too_many_arguments)]
pub fn base_tool_set(
    agent_id: AgentId,
    relational: Arc<dyn RelationalStore>,
    vector: Arc<dyn VectorStore>,
    tokenizer: Arc<dyn Tokenizer>,
    to_user: UnboundedSender<hearth_core::events::WorkerEvent>,
    chunk_max_tokens: usize,
    persona_max_words: usize,
) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(PersonaAppendTool::new(agent_id, relational.clone(), persona_max_words)),
        Arc::new(PersonaReplaceTool::new(agent_id, relational.clone(), persona_max_words)),
        Arc::new(PushTaskTool::new(agent_id, relational.clone())),
        Arc::new(PopTaskTool::new(agent_id, relational.clone())),
        Arc::new(RecallSearchTool::new(agent_id, relational.clone())),
        Arc::new(RecallSearchByDateTool::new(agent_id, relational.clone())),
        Arc::new(ArchivalInsertTool::new(agent_id, vector.clone(), tokenizer, chunk_max_tokens)),
        Arc::new(ArchivalSearchTool::new(agent_id, vector)),
        Arc::new(ChatLogSearchTool::new(agent_id, relational.clone())),
        Arc::new(ChatLogSearchByDateTool::new(agent_id, relational.clone())),
        Arc::new(SendMessageTool::new(agent_id, relational, to_user)),
    ]
}
