//! The agent worker: a `tokio::task` that owns one agent's heartbeat loop
//! for the duration of one run, grounded in `original_source/agent.py`'s
//! `call_agent_worker`. The original ran this as a `multiprocessing.Process`
//! communicating over a `Pipe`; here it's a `tokio::task` communicating over
//! a pair of `tokio::sync::mpsc` channels, matching how every other
//! worker/supervisor boundary in this workspace is expressed.

use std::sync::Arc;

use hearth_core::events::{SessionCommand, WorkerEvent};
use hearth_core::traits::{LanguageModel, RelationalStore, Tokenizer};
use hearth_core::AgentId;
use hearth_tools::ToolRegistry;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::heartbeat::{self, HeartbeatConfig};
use crate::memory::AgentMemory;

/// Runs one agent's heartbeat loop from first `CallAgent` turn to halt.
///
/// Mirrors `call_agent_worker`'s `try/except/finally`: whatever happens,
/// the last thing this function does is send [`WorkerEvent::Halt`] so the
/// supervisor can release the per-agent lock. A fatal error is reported as
/// [`WorkerEvent::Error`] immediately before that final `Halt`.
pub async fn run_agent_worker(
    agent_id: AgentId,
    store: Arc<dyn RelationalStore>,
    llm: Arc<dyn LanguageModel>,
    tokenizer: Arc<dyn Tokenizer>,
    tools: Arc<ToolRegistry>,
    system_prompt: String,
    recursive_summary_prompt: String,
    heartbeat_tuning: HeartbeatConfig,
    events: UnboundedSender<WorkerEvent>,
    mut commands: UnboundedReceiver<SessionCommand>,
) {
    let memory = AgentMemory::new(agent_id, store);

    let config = HeartbeatConfig { system_prompt, recursive_summary_prompt, ..heartbeat_tuning };

    let result = heartbeat::run(
        &memory,
        llm.as_ref(),
        tokenizer.as_ref(),
        tools.as_ref(),
        &events,
        &mut commands,
        &config,
    )
    .await;

    if let Err(e) = result {
        let _ = events.send(WorkerEvent::Error(e.to_string()));
    }

    let _ = events.send(WorkerEvent::Halt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use hearth_core::traits::{AgentRow, ChatLogRow, ChatTurn};
    use hearth_core::Message;
    use std::sync::Mutex;

    struct StaticModel(&'static str);

    #[async_trait]
    impl LanguageModel for StaticModel {
        async fn complete(&self, _messages: &[ChatTurn]) -> hearth_core::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct WordTokenizer;
    impl Tokenizer for WordTokenizer {
        fn count_tokens(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    struct HaltingStore {
        fifo: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl RelationalStore for HaltingStore {
        async fn create_agent(&self, _optional_tool_sets: Vec<String>) -> hearth_core::Result<AgentRow> {
            unimplemented!()
        }
        async fn get_agent(&self, id: AgentId) -> hearth_core::Result<AgentRow> {
            Ok(AgentRow {
                id,
                optional_tool_sets: vec![],
                created_at: Utc::now(),
                recursive_summary: String::new(),
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
        async fn peek_fifo(&self, id: AgentId) -> hearth_core::Result<Message> {
            self.fifo
                .lock()
                .unwrap()
                .first()
                .cloned()
                .ok_or_else(|| hearth_core::Error::missing(format!("empty fifo for {id}")))
        }
        async fn pop_fifo(&self, id: AgentId) -> hearth_core::Result<Message> {
            let mut fifo = self.fifo.lock().unwrap();
            if fifo.is_empty() {
                return Err(hearth_core::Error::missing(format!("empty fifo for {id}")));
            }
            Ok(fifo.remove(0))
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

    /// A worker whose model always replies with `do_heartbeat: false` halts
    /// after a single `CallAgent` turn and always emits a final `Halt` event.
    #[tokio::test]
    async fn worker_halts_after_one_non_heartbeat_turn() {
        let response = r#"```yaml
emotions: []
thoughts: ["greeting the user"]
function_call:
  name: send_message
  arguments: {message: "hi there"}
  do_heartbeat: false
```"#;

        let agent_id = AgentId::new_v4();
        let store: Arc<dyn RelationalStore> = Arc::new(HaltingStore { fifo: Mutex::new(vec![]) });
        let llm: Arc<dyn LanguageModel> = Arc::new(StaticModel(response));
        let tokenizer: Arc<dyn Tokenizer> = Arc::new(WordTokenizer);

        let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel();
        let (_command_tx, command_rx) = tokio::sync::mpsc::unbounded_channel();

        let tools = Arc::new(
            ToolRegistry::new(
                vec![Arc::new(hearth_tools::base::general::SendMessageTool::new(
                    agent_id,
                    store.clone(),
                    event_tx.clone(),
                ))],
                vec![],
            )
            .unwrap(),
        );

        let config = HeartbeatConfig {
            system_prompt: String::new(),
            recursive_summary_prompt: String::new(),
            ctx_window: 8192,
            warn_frac: 0.8,
            flush_frac: 0.95,
            flush_tgt_frac: 0.6,
            fmin: 5,
            overthink_n: 10,
            validation_retries: 3,
        };

        run_agent_worker(
            agent_id,
            store,
            llm,
            tokenizer,
            tools,
            String::new(),
            String::new(),
            config,
            event_tx,
            command_rx,
        )
        .await;

        let mut events = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.last(), Some(&WorkerEvent::Halt));
        assert!(events.iter().any(|e| matches!(e, WorkerEvent::Message(_))));
    }
}
