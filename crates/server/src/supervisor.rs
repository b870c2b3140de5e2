//! Per-agent session supervisor: the `tokio::task`/channel replacement for
//! `original_source/agent.py`'s `multiprocessing.Process`/`Pipe` pair
//! (spec §4.6, §5).
//!
//! One run of the heartbeat loop is a "session": it starts when a user
//! message is submitted, runs until the loop halts on its own or is told
//! to, and ends by dropping its entry from [`Supervisor`]'s table. The
//! `DashMap<AgentId, Arc<Mutex<()>>>` lock (spec §5) makes a second submit
//! for the same agent fail fast instead of racing the first.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use hearth_core::events::{SessionCommand, WorkerEvent};
use hearth_core::traits::{LanguageModel, RelationalStore, Tokenizer, VectorStore};
use hearth_core::{AgentId, Message, MessageKind};
use hearth_tools::ToolRegistry;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, Mutex};

use hearth_agent::heartbeat::HeartbeatConfig;
use hearth_agent::memory::AgentMemory;
use hearth_agent::worker;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("agent {0} already has a run in progress")]
    Busy(AgentId),

    #[error(transparent)]
    Core(#[from] hearth_core::Error),

    #[error(transparent)]
    Agent(#[from] hearth_agent::AgentError),

    #[error(transparent)]
    Tool(#[from] hearth_tools::ToolError),
}

/// The live state of one in-flight heartbeat-loop run.
struct RunHandle {
    events: broadcast::Sender<WorkerEvent>,
    commands: mpsc::UnboundedSender<SessionCommand>,
}

pub struct Supervisor {
    store: Arc<dyn RelationalStore>,
    vector: Arc<dyn VectorStore>,
    llm: Arc<dyn LanguageModel>,
    tokenizer: Arc<dyn Tokenizer>,
    system_prompt: String,
    recursive_summary_prompt: String,
    heartbeat_tuning: HeartbeatConfig,
    chunk_max_tokens: usize,
    persona_max_words: usize,
    locks: DashMap<AgentId, Arc<Mutex<()>>>,
    runs: Arc<DashMap<AgentId, RunHandle>>,
}

impl Supervisor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn RelationalStore>,
        vector: Arc<dyn VectorStore>,
        llm: Arc<dyn LanguageModel>,
        tokenizer: Arc<dyn Tokenizer>,
        system_prompt: String,
        recursive_summary_prompt: String,
        heartbeat_tuning: HeartbeatConfig,
        chunk_max_tokens: usize,
        persona_max_words: usize,
    ) -> Self {
        Self {
            store,
            vector,
            llm,
            tokenizer,
            system_prompt,
            recursive_summary_prompt,
            heartbeat_tuning,
            chunk_max_tokens,
            persona_max_words,
            locks: DashMap::new(),
            runs: Arc::new(DashMap::new()),
        }
    }

    fn lock_for(&self, agent_id: AgentId) -> Arc<Mutex<()>> {
        self.locks.entry(agent_id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    fn clone_heartbeat_tuning(&self) -> HeartbeatConfig {
        HeartbeatConfig {
            system_prompt: self.system_prompt.clone(),
            recursive_summary_prompt: self.recursive_summary_prompt.clone(),
            ctx_window: self.heartbeat_tuning.ctx_window,
            warn_frac: self.heartbeat_tuning.warn_frac,
            flush_frac: self.heartbeat_tuning.flush_frac,
            flush_tgt_frac: self.heartbeat_tuning.flush_tgt_frac,
            fmin: self.heartbeat_tuning.fmin,
            overthink_n: self.heartbeat_tuning.overthink_n,
            validation_retries: self.heartbeat_tuning.validation_retries,
        }
    }

    /// Builds the tool registry for one agent's run, grounded in the
    /// original's `function_sets.py` loader: the always-present base set
    /// plus whatever optional sets the agent was created with.
    async fn build_tool_registry(
        &self,
        agent_id: AgentId,
        events: mpsc::UnboundedSender<WorkerEvent>,
    ) -> Result<ToolRegistry, SupervisorError> {
        let row = self.store.get_agent(agent_id).await?;
        let base = hearth_tools::base::base_tool_set(
            agent_id,
            self.store.clone(),
            self.vector.clone(),
            self.tokenizer.clone(),
            events,
            self.chunk_max_tokens,
            self.persona_max_words,
        );
        let optional = hearth_tools::optional::resolve_optional_tool_sets(&row.optional_tool_sets)?;
        Ok(ToolRegistry::new(base, optional)?)
    }

    /// Pushes `text` as a message of the given `kind` (spec §6 allows
    /// `user` or `system` input), then spawns the heartbeat loop to react
    /// to it. Fails immediately (without queuing) if a run is already
    /// active for this agent.
    pub async fn submit_input(
        &self,
        agent_id: AgentId,
        kind: MessageKind,
        text: String,
    ) -> Result<broadcast::Receiver<WorkerEvent>, SupervisorError> {
        let lock = self.lock_for(agent_id);
        let guard = lock.try_lock_owned().map_err(|_| SupervisorError::Busy(agent_id))?;

        let memory = AgentMemory::new(agent_id, self.store.clone());
        let message = match kind {
            MessageKind::System => Message::system(text.clone(), Utc::now()),
            _ => Message::user(text.clone(), Utc::now()),
        };
        memory.push_message(&message).await?;
        memory.push_chat_log(&text, false).await?;

        let (worker_event_tx, mut worker_event_rx) = mpsc::unbounded_channel::<WorkerEvent>();
        let tools = Arc::new(self.build_tool_registry(agent_id, worker_event_tx.clone()).await?);

        let (broadcast_tx, broadcast_rx) = broadcast::channel(256);
        let (command_tx, command_rx) = mpsc::unbounded_channel::<SessionCommand>();

        self.runs.insert(agent_id, RunHandle { events: broadcast_tx.clone(), commands: command_tx });

        let store = self.store.clone();
        let llm = self.llm.clone();
        let tokenizer = self.tokenizer.clone();
        let system_prompt = self.system_prompt.clone();
        let recursive_summary_prompt = self.recursive_summary_prompt.clone();
        let heartbeat_tuning = self.clone_heartbeat_tuning();
        let runs = self.runs.clone();

        tokio::spawn(async move {
            let _guard = guard;

            let worker_run = worker::run_agent_worker(
                agent_id,
                store,
                llm,
                tokenizer,
                tools,
                system_prompt,
                recursive_summary_prompt,
                heartbeat_tuning,
                worker_event_tx,
                command_rx,
            );

            // Forwards worker events onto the broadcast channel every WS
            // subscriber listens on, then drops this run's bookkeeping the
            // moment the worker's terminal `Halt` is observed. Runs
            // concurrently with the worker itself so subscribers see events
            // as they're produced rather than all at once at the end.
            let forward_events = async {
                while let Some(event) = worker_event_rx.recv().await {
                    let halted = matches!(event, WorkerEvent::Halt);
                    let _ = broadcast_tx.send(event);
                    if halted {
                        break;
                    }
                }
            };

            tokio::join!(worker_run, forward_events);
            runs.remove(&agent_id);
        });

        Ok(broadcast_rx)
    }

    /// Subscribes to the live event stream of an in-flight run, if any.
    pub fn subscribe(&self, agent_id: AgentId) -> Option<broadcast::Receiver<WorkerEvent>> {
        self.runs.get(&agent_id).map(|handle| handle.events.subscribe())
    }

    /// Forwards a `halt`/`halt_soon` command to an in-flight run.
    pub fn send_command(&self, agent_id: AgentId, command: SessionCommand) -> bool {
        match self.runs.get(&agent_id) {
            Some(handle) => handle.commands.send(command).is_ok(),
            None => false,
        }
    }

    pub fn is_running(&self, agent_id: AgentId) -> bool {
        self.runs.contains_key(&agent_id)
    }
}
