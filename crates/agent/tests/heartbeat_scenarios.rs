//! End-to-end heartbeat-loop scenarios against in-memory fakes.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hearth_agent::heartbeat::{self, HeartbeatConfig};
use hearth_agent::memory::AgentMemory;
use hearth_core::events::{SessionCommand, WorkerEvent};
use hearth_core::traits::{AgentRow, ChatLogRow, ChatTurn, LanguageModel, RelationalStore, Tokenizer};
use hearth_core::{AgentId, Message};
use hearth_tools::base::general::SendMessageTool;
use hearth_tools::ToolRegistry;

struct WordTokenizer;
impl Tokenizer for WordTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/// Returns canned responses in order, looping the last one once exhausted.
struct ScriptedModel {
    responses: Vec<&'static str>,
    calls: Mutex<usize>,
}

impl ScriptedModel {
    fn new(responses: Vec<&'static str>) -> Self {
        Self { responses, calls: Mutex::new(0) }
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, _messages: &[ChatTurn]) -> hearth_core::Result<String> {
        let mut calls = self.calls.lock().unwrap();
        let index = (*calls).min(self.responses.len() - 1);
        *calls += 1;
        Ok(self.responses[index].to_string())
    }
}

struct FakeStore {
    fifo: Mutex<Vec<Message>>,
    summary: Mutex<(String, DateTime<Utc>)>,
    chat_log: Mutex<Vec<(String, bool)>>,
}

impl FakeStore {
    fn new(summary: &str) -> Self {
        Self {
            fifo: Mutex::new(vec![]),
            summary: Mutex::new((summary.to_string(), Utc::now())),
            chat_log: Mutex::new(vec![]),
        }
    }

    fn preload(&self, messages: Vec<Message>) {
        *self.fifo.lock().unwrap() = messages;
    }
}

#[async_trait]
impl RelationalStore for FakeStore {
    async fn create_agent(&self, _optional_tool_sets: Vec<String>) -> hearth_core::Result<AgentRow> {
        unimplemented!()
    }
    async fn get_agent(&self, id: AgentId) -> hearth_core::Result<AgentRow> {
        let (summary, update_time) = self.summary.lock().unwrap().clone();
        Ok(AgentRow {
            id,
            optional_tool_sets: vec![],
            created_at: Utc::now(),
            recursive_summary: summary,
            recursive_summary_update_time: update_time,
        })
    }
    async fn list_agents(&self) -> hearth_core::Result<Vec<AgentRow>> {
        Ok(vec![])
    }
    async fn delete_agent(&self, _id: AgentId) -> hearth_core::Result<()> {
        Ok(())
    }
    async fn update_recursive_summary(&self, _id: AgentId, summary: &str) -> hearth_core::Result<()> {
        *self.summary.lock().unwrap() = (summary.to_string(), Utc::now());
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
    async fn append_chat_log(&self, _id: AgentId, message: &str, from_assistant: bool) -> hearth_core::Result<()> {
        self.chat_log.lock().unwrap().push((message.to_string(), from_assistant));
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

fn test_config() -> HeartbeatConfig {
    HeartbeatConfig {
        system_prompt: "you are an agent".to_string(),
        recursive_summary_prompt: "summarize".to_string(),
        ctx_window: 8192,
        warn_frac: 0.8,
        flush_frac: 0.95,
        flush_tgt_frac: 0.6,
        fmin: 5,
        overthink_n: 10,
        validation_retries: 3,
    }
}

/// Scenario 2: an unknown tool call is routed to `InvalidFunction`, which
/// appends a failed `function_res` and forces `do_heartbeat=true`
/// regardless of what the model asked for, continuing the loop.
#[tokio::test]
async fn unknown_tool_call_forces_another_heartbeat() {
    let unknown_tool_response = r#"```yaml
emotions: []
thoughts: ["trying a tool that isn't registered"]
function_call:
  name: does_not_exist
  arguments: {}
  do_heartbeat: false
```"#;
    let send_message_response = r#"```yaml
emotions: []
thoughts: ["giving up and greeting instead"]
function_call:
  name: send_message
  arguments: {message: "hi"}
  do_heartbeat: false
```"#;

    let fake_store = Arc::new(FakeStore::new("nothing yet"));
    let store: Arc<dyn RelationalStore> = fake_store.clone();
    let llm = ScriptedModel::new(vec![unknown_tool_response, send_message_response]);
    let tokenizer = WordTokenizer;

    let agent_id = AgentId::new_v4();
    let memory = AgentMemory::new(agent_id, store.clone());
    memory.push_message(&Message::user("hi", Utc::now())).await.unwrap();

    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel();
    let (_command_tx, mut command_rx) = tokio::sync::mpsc::unbounded_channel();
    let tools =
        ToolRegistry::new(vec![Arc::new(SendMessageTool::new(agent_id, store.clone(), event_tx.clone()))], vec![])
            .unwrap();

    heartbeat::run(&memory, &llm, &tokenizer, &tools, &event_tx, &mut command_rx, &test_config())
        .await
        .unwrap();

    let fifo = store.fifo_messages(agent_id).await.unwrap();
    let failed_result = fifo.iter().find(|m| {
        matches!(
            &m.content,
            hearth_core::MessageContent::FunctionResult(r) if !r.success
        )
    });
    assert!(failed_result.is_some(), "expected a failed function_res for the unknown tool");

    let mut events = Vec::new();
    while let Ok(event) = event_rx.try_recv() {
        events.push(event);
    }
    assert!(events.iter().any(|e| matches!(e, WorkerEvent::ToUser(text) if text == "hi")));
    assert_eq!(*llm.calls.lock().unwrap(), 2, "the loop must have continued past the invalid call");

    let chat_log = fake_store.chat_log.lock().unwrap().clone();
    assert!(
        chat_log.contains(&("hi".to_string(), true)),
        "send_message must land in the chat log as an assistant-side entry, got {chat_log:?}"
    );
}

/// Scenario 5: `halt_soon` leaves a system note and keeps the loop going;
/// a follow-up `halt` stops it on the very next tick.
#[tokio::test]
async fn halt_soon_then_halt_stops_the_loop() {
    let keep_going_response = r#"```yaml
emotions: []
thoughts: ["still working"]
function_call:
  name: send_message
  arguments: {message: "still on it"}
  do_heartbeat: true
```"#;

    let fake_store = Arc::new(FakeStore::new("nothing yet"));
    let store: Arc<dyn RelationalStore> = fake_store.clone();
    let llm = ScriptedModel::new(vec![keep_going_response]);
    let tokenizer = WordTokenizer;

    let agent_id = AgentId::new_v4();
    let memory = AgentMemory::new(agent_id, store.clone());

    let (event_tx, _event_rx) = tokio::sync::mpsc::unbounded_channel();
    let (command_tx, mut command_rx) = tokio::sync::mpsc::unbounded_channel();
    command_tx.send(SessionCommand::HaltSoon).unwrap();
    command_tx.send(SessionCommand::Halt).unwrap();

    let tools =
        ToolRegistry::new(vec![Arc::new(SendMessageTool::new(agent_id, store.clone(), event_tx.clone()))], vec![])
            .unwrap();

    heartbeat::run(&memory, &llm, &tokenizer, &tools, &event_tx, &mut command_rx, &test_config())
        .await
        .unwrap();

    let fifo = store.fifo_messages(agent_id).await.unwrap();
    let notes: Vec<&str> = fifo
        .iter()
        .filter_map(|m| match &m.content {
            hearth_core::MessageContent::Text(t) if m.kind == hearth_core::MessageKind::System => {
                Some(t.message.as_str())
            },
            _ => None,
        })
        .collect();

    assert!(notes.iter().any(|n| n.contains("halt was requested soon")));
    assert!(notes.iter().any(|n| n.contains("halt was requested") && !n.contains("soon")));
    assert_eq!(*llm.calls.lock().unwrap(), 2, "halt_soon keeps the loop going for one more tick, halt stops it");

    let chat_log = fake_store.chat_log.lock().unwrap().clone();
    assert!(
        chat_log.iter().any(|(text, from_assistant)| !from_assistant && text.contains("halt was requested soon")),
        "a system note must land in the chat log as a non-assistant entry, got {chat_log:?}"
    );
}

/// Scenario 3 / invariant I5: flushing the FIFO Queue always leaves either
/// `len(FIFO) >= FMIN` or a user-kind head, and the stored summary reflects
/// the summarizer's output with a not-earlier update time.
#[tokio::test]
async fn overflow_flush_respects_the_floor_and_updates_the_summary() {
    let store = FakeStore::new("old summary");
    let before = Utc::now();

    let mut preload = Vec::new();
    for i in 0..20 {
        preload.push(Message::system(format!("padding message number {i} with several words"), before));
    }
    preload.push(Message::user("the actual recent question", before));
    store.preload(preload);

    let agent_id = AgentId::new_v4();
    let memory = AgentMemory::new(agent_id, Arc::new(store));
    let llm = ScriptedModel::new(vec![
        r#"```yaml
analysis: condensing the padding
summary: "S'"
```"#,
    ]);
    let tokenizer = WordTokenizer;

    hearth_agent::summarizer::flush_fifo_queue(
        &memory,
        &llm,
        "you are an agent",
        &tokenizer,
        "summarize",
        0.3,
        20,
        5,
    )
    .await
    .unwrap();

    let (summary, update_time) = memory.recursive_summary().await.unwrap();
    assert_eq!(summary, "S'");
    assert!(update_time >= before);

    let fifo_len = memory.store.fifo_len(agent_id).await.unwrap();
    let head_is_user = match memory.store.peek_fifo(agent_id).await {
        Ok(m) => m.kind == hearth_core::MessageKind::User,
        Err(_) => true,
    };
    assert!(fifo_len >= 5 || head_is_user, "flush must stop at the floor or a user-kind head");
}
