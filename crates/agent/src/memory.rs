//! The memory facade an agent worker drives: Working Context, FIFO Queue,
//! Recall Storage and the recursive summary all live behind
//! [`hearth_core::traits::RelationalStore`]; this module only adds the
//! cross-tier operations the original's `Memory` dataclass bundled
//! (`push_message`, `main_ctx`, `in_ctx_no_tokens`), grounded in
//! `original_source/memory.py`'s `Memory` class.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hearth_core::traits::{ChatTurn, RelationalStore, Tokenizer};
use hearth_core::{AgentId, Message};

use crate::error::AgentError;

/// Per-agent handle over the relational store, bundling the agent id so
/// callers don't have to keep threading it through every call.
#[derive(Clone)]
pub struct AgentMemory {
    pub agent_id: AgentId,
    pub store: Arc<dyn RelationalStore>,
}

impl AgentMemory {
    pub fn new(agent_id: AgentId, store: Arc<dyn RelationalStore>) -> Self {
        Self { agent_id, store }
    }

    /// Appends `message` to both the FIFO Queue and Recall Storage,
    /// mirroring the original's `Memory.push_message` — every message
    /// that ever enters the context window is durably recorded whether
    /// or not it is later evicted.
    pub async fn push_message(&self, message: &Message) -> Result<(), AgentError> {
        self.store.push_fifo(self.agent_id, message).await?;
        self.store.append_recall(self.agent_id, message).await?;
        Ok(())
    }

    /// Appends a user-visible line to the Chat Log (spec §4.1's simplified
    /// transcript: direct user inputs, direct assistant sends, and system
    /// notices — never the assistant's internal thought/tool envelope).
    pub async fn push_chat_log(&self, text: &str, from_assistant: bool) -> Result<(), AgentError> {
        self.store.append_chat_log(self.agent_id, text, from_assistant).await?;
        Ok(())
    }

    pub async fn recursive_summary(&self) -> Result<(String, DateTime<Utc>), AgentError> {
        let row = self.store.get_agent(self.agent_id).await?;
        Ok((row.recursive_summary, row.recursive_summary_update_time))
    }

    /// Assembles the chat-completion message list the way
    /// `Memory.main_ctx` does: a system entry carrying the system prompt,
    /// a synthetic system entry carrying the recursive summary, then the
    /// FIFO Queue translated to `user`/`assistant` turns with consecutive
    /// non-assistant entries concatenated by `"\n\n"`.
    pub async fn main_context(&self, system_prompt: &str) -> Result<Vec<ChatTurn>, AgentError> {
        let (summary, update_time) = self.recursive_summary().await?;
        let summary_message = Message::system(
            format!(
                "# Recursive summary (contains conversation history before beginning of context window, if any)\n\n{summary}"
            ),
            update_time,
        );

        let fifo = self.store.fifo_messages(self.agent_id).await?;

        let mut turns = vec![ChatTurn::new("system", system_prompt)];
        let mut pending_user: Vec<String> = Vec::new();

        for message in std::iter::once(summary_message).chain(fifo) {
            let (role, content) = message.to_std_message_format()?;
            if role == "user" {
                pending_user.push(content);
            } else {
                if !pending_user.is_empty() {
                    turns.push(ChatTurn::new("user", pending_user.join("\n\n")));
                    pending_user.clear();
                }
                turns.push(ChatTurn::new("assistant", content));
            }
        }

        if !pending_user.is_empty() {
            turns.push(ChatTurn::new("user", pending_user.join("\n\n")));
        }

        Ok(turns)
    }

    /// Token count of [`Self::main_context`], used against the
    /// `CTX_WINDOW`/`WARN_FRAC`/`FLUSH_FRAC` thresholds (spec §4.3).
    pub async fn in_context_tokens(&self, system_prompt: &str, tokenizer: &dyn Tokenizer) -> Result<usize, AgentError> {
        let turns = self.main_context(system_prompt).await?;
        let joined: String = turns.iter().map(|t| format!("{}\n{}", t.role, t.content)).collect();
        Ok(tokenizer.count_tokens(&joined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hearth_core::traits::{AgentRow, ChatLogRow};
    use std::sync::Mutex;

    struct FakeStore {
        fifo: Mutex<Vec<Message>>,
        summary: String,
    }

    #[async_trait]
    impl RelationalStore for FakeStore {
        async fn create_agent(&self, _optional_tool_sets: Vec<String>) -> hearth_core::Result<AgentRow> {
            unimplemented!()
        }
        async fn get_agent(&self, id: AgentId) -> hearth_core::Result<AgentRow> {
            Ok(AgentRow {
                id,
                optional_tool_sets: vec![],
                created_at: Utc::now(),
                recursive_summary: self.summary.clone(),
                recursive_summary_update_time: Utc::now(),
            })
        }
        async fn list_agents(&self) -> hearth_core::Result<Vec<AgentRow>> {
            Ok(vec![])
        }
        async fn delete_agent(&self, _id: AgentId) -> hearth_core::Result<()> {
            Ok(())
        }
        async fn update_recursive_summary(&self, _id: AgentId, _summary: &str) -> hearth_core::Result<()> {
            Ok(())
        }
        async fn get_agent_persona(&self, _id: AgentId) -> hearth_core::Result<String> {
            Ok(String::new())
        }
        async fn get_user_persona(&self, _id: AgentId) -> hearth_core::Result<String> {
            Ok(String::new())
        }
        async fn set_agent_persona(&self, _id: AgentId, _persona: &str) -> hearth_core::Result<()> {
            Ok(())
        }
        async fn set_user_persona(&self, _id: AgentId, _persona: &str) -> hearth_core::Result<()> {
            Ok(())
        }
        async fn get_tasks(&self, _id: AgentId) -> hearth_core::Result<Vec<String>> {
            Ok(vec![])
        }
        async fn push_task(&self, _id: AgentId, _task: &str) -> hearth_core::Result<()> {
            Ok(())
        }
        async fn pop_task(&self, _id: AgentId) -> hearth_core::Result<String> {
            unimplemented!()
        }
        async fn append_recall(&self, _id: AgentId, _message: &Message) -> hearth_core::Result<()> {
            Ok(())
        }
        async fn search_recall(&self, _id: AgentId, _query: &str, _page: usize) -> hearth_core::Result<Vec<Message>> {
            Ok(vec![])
        }
        async fn search_recall_by_date(
            &self,
            _id: AgentId,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _page: usize,
        ) -> hearth_core::Result<Vec<Message>> {
            Ok(vec![])
        }
        async fn push_fifo(&self, _id: AgentId, message: &Message) -> hearth_core::Result<()> {
            self.fifo.lock().unwrap().push(message.clone());
            Ok(())
        }
        async fn peek_fifo(&self, _id: AgentId) -> hearth_core::Result<Message> {
            unimplemented!()
        }
        async fn pop_fifo(&self, _id: AgentId) -> hearth_core::Result<Message> {
            unimplemented!()
        }
        async fn fifo_len(&self, _id: AgentId) -> hearth_core::Result<usize> {
            Ok(self.fifo.lock().unwrap().len())
        }
        async fn fifo_messages(&self, _id: AgentId) -> hearth_core::Result<Vec<Message>> {
            Ok(self.fifo.lock().unwrap().clone())
        }
        async fn append_chat_log(&self, _id: AgentId, _message: &str, _from_assistant: bool) -> hearth_core::Result<()> {
            Ok(())
        }
        async fn search_chat_log(&self, _id: AgentId, _query: &str, _page: usize) -> hearth_core::Result<Vec<ChatLogRow>> {
            Ok(vec![])
        }
        async fn search_chat_log_by_date(
            &self,
            _id: AgentId,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _page: usize,
        ) -> hearth_core::Result<Vec<ChatLogRow>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn consecutive_user_messages_concatenate_before_an_assistant_turn() {
        let store = Arc::new(FakeStore { fifo: Mutex::new(vec![]), summary: "nothing yet".to_string() });
        let agent_id = AgentId::new_v4();
        let memory = AgentMemory::new(agent_id, store.clone());

        let now = Utc::now();
        memory.push_message(&Message::user("hello", now)).await.unwrap();
        memory.push_message(&Message::system("a system note", now)).await.unwrap();
        memory
            .push_message(&Message::assistant(
                hearth_core::AssistantContent {
                    emotions: vec![],
                    thoughts: vec![],
                    function_call: hearth_core::FunctionCall {
                        name: "send_message".to_string(),
                        arguments: serde_json::json!({}),
                        do_heartbeat: false,
                    },
                },
                now,
            ))
            .await
            .unwrap();

        let turns = memory.main_context("you are an agent").await.unwrap();
        // [0]=system prompt, [1]=summary(system, solo => folded into the single user turn with "hello"+note), [2]=user, [3]=assistant
        assert_eq!(turns[0].role, "system");
        assert_eq!(turns[1].role, "user");
        assert!(turns[1].content.contains("hello"));
        assert!(turns[1].content.contains("a system note"));
        assert_eq!(turns[2].role, "assistant");
    }
}
