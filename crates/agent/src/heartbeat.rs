//! The heartbeat control loop: `CallAgent -> {RunTool | InvalidFunction} ->
//! ExitOrContinue -> {CallAgent | halt}`, grounded in
//! `original_source/agent.py`'s pocketflow node graph. Here the graph is a
//! plain async loop since there's no need for pocketflow's generality over
//! a single linear cycle.

use chrono::Utc;
use hearth_core::events::{SessionCommand, WorkerEvent};
use hearth_core::traits::{LanguageModel, Tokenizer};
use hearth_core::{AssistantContent, FunctionCall, FunctionResultContent, Message};
use hearth_tools::ToolRegistry;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::AgentError;
use crate::memory::AgentMemory;
use crate::summarizer;

/// Everything a single heartbeat-loop run needs, bundled so
/// [`run`]'s signature stays readable. Built once per agent worker and
/// reused across the worker's lifetime.
pub struct HeartbeatConfig {
    pub system_prompt: String,
    pub recursive_summary_prompt: String,
    pub ctx_window: usize,
    pub warn_frac: f64,
    pub flush_frac: f64,
    pub flush_tgt_frac: f64,
    pub fmin: usize,
    pub overthink_n: usize,
    pub validation_retries: usize,
}

/// Mutable state threaded through a run of the loop, mirroring the local
/// variables `ExitOrContinue` closed over in the original (`shared` dict).
struct LoopState {
    ctx_window_warning_given: bool,
    loops_since_overthink_warning: usize,
}

impl Default for LoopState {
    fn default() -> Self {
        Self { ctx_window_warning_given: false, loops_since_overthink_warning: 0 }
    }
}

#[derive(Debug, serde::Deserialize)]
struct CallAgentResult {
    emotions: Vec<(String, u8)>,
    thoughts: Vec<String>,
    function_call: FunctionCall,
}

/// Runs the heartbeat loop to completion: one `CallAgent` turn, a tool
/// dispatch, then `ExitOrContinue`'s bookkeeping, repeating while
/// `do_heartbeat` stays true. Returns once the loop halts, whether by the
/// model's own choice, a supervisor command, or a fatal error.
pub async fn run(
    memory: &AgentMemory,
    llm: &dyn LanguageModel,
    tokenizer: &dyn Tokenizer,
    tools: &ToolRegistry,
    events: &UnboundedSender<WorkerEvent>,
    commands: &mut tokio::sync::mpsc::UnboundedReceiver<SessionCommand>,
    config: &HeartbeatConfig,
) -> Result<(), AgentError> {
    let mut state = LoopState::default();

    loop {
        let do_heartbeat = call_agent(memory, llm, tokenizer, tools, events, config).await?;

        match exit_or_continue(memory, llm, tokenizer, events, commands, config, &mut state, do_heartbeat).await? {
            Continuation::Heartbeat => continue,
            Continuation::Halt => return Ok(()),
        }
    }
}

/// `CallAgent`: assembles context, calls the model, validates the YAML
/// response (with the original's schema-fallback retry), records the
/// assistant turn, dispatches the requested function, and records its
/// result. Returns the function call's `do_heartbeat` flag (forced `true`
/// if the named function doesn't exist, matching `InvalidFunction`).
async fn call_agent(
    memory: &AgentMemory,
    llm: &dyn LanguageModel,
    tokenizer: &dyn Tokenizer,
    tools: &ToolRegistry,
    events: &UnboundedSender<WorkerEvent>,
    config: &HeartbeatConfig,
) -> Result<bool, AgentError> {
    let turns = memory.main_context(&config.system_prompt).await?;

    let mut last_error = String::new();
    let result = 'retry: loop {
        for attempt in 0..config.validation_retries {
            let _ = events.send(WorkerEvent::Ping);
            let response = llm.complete(&turns).await?;

            match parse_call_agent_result(&response) {
                Ok(result) => break 'retry result,
                Err(e) => {
                    last_error = e;
                    let _ = events.send(WorkerEvent::Debug(format!(
                        "assistant response failed validation on attempt {attempt}: {last_error}"
                    )));
                },
            }
        }
        return Err(AgentError::ResponseValidation {
            attempts: config.validation_retries as u32,
            last_error,
        });
    };

    let now = Utc::now();
    let assistant_message = Message::assistant(
        AssistantContent {
            emotions: result.emotions.clone(),
            thoughts: result.thoughts.clone(),
            function_call: result.function_call.clone(),
        },
        now,
    );
    memory.push_message(&assistant_message).await?;
    let _ = events.send(WorkerEvent::Message(assistant_message.to_intermediate_repr()));

    let function_call = result.function_call;
    let do_heartbeat = match tools.execute(&function_call.name, function_call.arguments.clone()).await {
        Ok(value) => {
            let content = FunctionResultContent { success: true, result: value };
            record_function_result(memory, events, content).await?;
            function_call.do_heartbeat
        },
        Err(hearth_tools::ToolError::NotFound(_)) => {
            // InvalidFunction
            let content = FunctionResultContent {
                success: false,
                result: serde_json::json!("Function does not exist"),
            };
            record_function_result(memory, events, content).await?;
            true
        },
        Err(e) => {
            let content =
                FunctionResultContent { success: false, result: serde_json::json!(e.to_string()) };
            record_function_result(memory, events, content).await?;
            function_call.do_heartbeat
        },
    };

    Ok(do_heartbeat)
}

async fn record_function_result(
    memory: &AgentMemory,
    events: &UnboundedSender<WorkerEvent>,
    content: FunctionResultContent,
) -> Result<(), AgentError> {
    let message = Message::function_result(content, Utc::now());
    memory.push_message(&message).await?;
    let _ = events.send(WorkerEvent::Message(message.to_intermediate_repr()));
    Ok(())
}

/// The original's `CallAgent.exec` tries validating the raw result as
/// `CallAgentResult` first, then falls back to validating `result["content"]`
/// "if the LLM decides to conform to the input schema instead of output
/// schema".
fn parse_call_agent_result(response: &str) -> Result<CallAgentResult, String> {
    let value = hearth_llm::extract_yaml(response).map_err(|e| e.to_string())?;

    if let Ok(result) = serde_yaml::from_value::<CallAgentResult>(value.clone()) {
        return Ok(result);
    }

    let nested = value.get("content").cloned().ok_or_else(|| "missing function_call".to_string())?;
    serde_yaml::from_value::<CallAgentResult>(nested).map_err(|e| e.to_string())
}

enum Continuation {
    Heartbeat,
    Halt,
}

/// `ExitOrContinue`: in priority order, handles FIFO overflow (flush),
/// the context-window warning threshold, a pending supervisor command, and
/// the overthink-loop warning, then decides whether another `CallAgent`
/// turn runs.
#[allow(clippy::too_many_arguments)]
async fn exit_or_continue(
    memory: &AgentMemory,
    llm: &dyn LanguageModel,
    tokenizer: &dyn Tokenizer,
    events: &UnboundedSender<WorkerEvent>,
    commands: &mut tokio::sync::mpsc::UnboundedReceiver<SessionCommand>,
    config: &HeartbeatConfig,
    state: &mut LoopState,
    mut do_heartbeat: bool,
) -> Result<Continuation, AgentError> {
    let in_ctx_tokens = memory.in_context_tokens(&config.system_prompt, tokenizer).await?;

    if (in_ctx_tokens as f64) > config.flush_frac * (config.ctx_window as f64) {
        push_system_note(
            memory,
            events,
            "Your FIFO Queue has grown too large and is being flushed to a recursive summary. Some earlier messages are no longer directly visible.",
        )
        .await?;
        state.ctx_window_warning_given = false;

        summarizer::flush_fifo_queue(
            memory,
            llm,
            &config.system_prompt,
            tokenizer,
            &config.recursive_summary_prompt,
            config.flush_tgt_frac,
            config.ctx_window,
            config.fmin,
        )
        .await?;

        // Do not otherwise touch heartbeat: fall through to the pending
        // control-command and overthink checks below with `do_heartbeat`
        // unchanged.
    } else if !state.ctx_window_warning_given && (in_ctx_tokens as f64) > config.warn_frac * (config.ctx_window as f64) {
        push_system_note(
            memory,
            events,
            "Your FIFO Queue is approaching its context window limit and will soon be flushed. Consider wrapping up or committing anything important to Archival Storage.",
        )
        .await?;
        state.ctx_window_warning_given = true;
        state.loops_since_overthink_warning = 0;
        do_heartbeat = true;
        return Ok(Continuation::Heartbeat);
    }

    if let Ok(command) = commands.try_recv() {
        match (command, do_heartbeat) {
            (SessionCommand::Halt, true) => {
                push_system_note(memory, events, "A halt was requested; ending this run now.").await?;
                do_heartbeat = false;
            },
            (SessionCommand::HaltSoon, true) => {
                push_system_note(memory, events, "A halt was requested soon; please finish up your current task.")
                    .await?;
                state.loops_since_overthink_warning = 0;
            },
            (SessionCommand::Halt, false) | (SessionCommand::HaltSoon, false) => {
                // Already halting; nothing further to do.
            },
        }
    }

    if do_heartbeat {
        state.loops_since_overthink_warning += 1;
        if state.loops_since_overthink_warning >= config.overthink_n {
            push_system_note(
                memory,
                events,
                "You have been running for many heartbeats in a row. Consider whether you have enough information to stop and send a message to the user.",
            )
            .await?;
            state.loops_since_overthink_warning = 0;
        }
    }

    if do_heartbeat {
        Ok(Continuation::Heartbeat)
    } else {
        Ok(Continuation::Halt)
    }
}

async fn push_system_note(
    memory: &AgentMemory,
    events: &UnboundedSender<WorkerEvent>,
    text: &str,
) -> Result<(), AgentError> {
    let message = Message::system(text, Utc::now());
    memory.push_message(&message).await?;
    memory.push_chat_log(text, false).await?;
    let _ = events.send(WorkerEvent::Message(message.to_intermediate_repr()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_direct_call_agent_result() {
        let response = r#"```yaml
emotions: []
thoughts: ["hi"]
function_call:
  name: send_message
  arguments: {message: "hello"}
  do_heartbeat: false
```"#;
        let parsed = parse_call_agent_result(response).unwrap();
        assert_eq!(parsed.function_call.name, "send_message");
        assert!(!parsed.function_call.do_heartbeat);
    }

    #[test]
    fn parses_content_wrapped_call_agent_result() {
        let response = r#"```yaml
content:
  emotions: []
  thoughts: []
  function_call:
    name: pop_task
    arguments: {}
    do_heartbeat: true
```"#;
        let parsed = parse_call_agent_result(response).unwrap();
        assert_eq!(parsed.function_call.name, "pop_task");
        assert!(parsed.function_call.do_heartbeat);
    }
}
