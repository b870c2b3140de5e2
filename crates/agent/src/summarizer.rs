//! Recursive summarizer — flushes the FIFO Queue when it grows past the
//! configured token fraction, grounded in `original_source/memory.py`'s
//! `Memory.flush_fifo_queue` and `GenerateNewRecursiveSummary`.

use hearth_core::traits::{ChatTurn, LanguageModel};

use crate::error::AgentError;
use crate::memory::AgentMemory;

/// Evicts FIFO Queue messages into a new recursive summary until the
/// remaining in-context token count drops to `target_frac * ctx_window`
/// and the queue head is a user message, matching the original's loop
/// condition exactly: keep evicting while (over target OR head isn't
/// user), unless the queue has shrunk to `fifo_min` and the head is
/// already a user message (then stop regardless).
pub async fn flush_fifo_queue(
    memory: &AgentMemory,
    llm: &dyn LanguageModel,
    system_prompt: &str,
    tokenizer: &dyn hearth_core::traits::Tokenizer,
    recursive_summary_prompt: &str,
    target_frac: f64,
    ctx_window: usize,
    fifo_min: usize,
) -> Result<(), AgentError> {
    let (summary, update_time) = memory.recursive_summary().await?;
    let summary_message = hearth_core::Message::system(
        format!(
            "# Recursive summary (contains conversation history before beginning of context window, if any)\n\n{summary}"
        ),
        update_time,
    );

    let mut evicted = vec![dump_yaml(&summary_message.to_intermediate_repr())?];

    loop {
        let in_ctx_tokens = memory.in_context_tokens(system_prompt, tokenizer).await?;
        let head_is_user = matches!(memory.store.peek_fifo(memory.agent_id).await, Ok(m) if m.kind == hearth_core::MessageKind::User);
        let over_target = (in_ctx_tokens as f64) > target_frac * (ctx_window as f64);

        if !(over_target || !head_is_user) {
            break;
        }

        let fifo_len = memory.store.fifo_len(memory.agent_id).await?;
        if fifo_len <= fifo_min && head_is_user {
            break;
        }
        if fifo_len == 0 {
            break;
        }

        let popped = memory.store.pop_fifo(memory.agent_id).await?;
        evicted.push(dump_yaml(&popped.to_intermediate_repr())?);
    }

    let new_summary = generate_new_summary(llm, recursive_summary_prompt, &evicted).await?;
    memory.store.update_recursive_summary(memory.agent_id, &new_summary).await?;
    Ok(())
}

fn dump_yaml(value: &serde_json::Value) -> Result<String, AgentError> {
    let dumped = serde_yaml::to_string(value).map_err(|e| AgentError::Core(hearth_core::Error::Yaml(e)))?;
    Ok(dumped.trim().to_string())
}

async fn generate_new_summary(
    llm: &dyn LanguageModel,
    recursive_summary_prompt: &str,
    evicted_message_strs: &[String],
) -> Result<String, AgentError> {
    let turns = vec![
        ChatTurn::new("system", recursive_summary_prompt),
        ChatTurn::new("user", evicted_message_strs.join("\n\n")),
    ];

    const MAX_RETRIES: u32 = 10;
    let mut last_error = String::new();
    for _ in 0..MAX_RETRIES {
        let resp = match llm.complete(&turns).await {
            Ok(resp) => resp,
            Err(e) => {
                last_error = e.to_string();
                continue;
            },
        };

        match hearth_llm::extract_yaml(&resp).and_then(|value| {
            serde_yaml::from_value::<GenerateNewRecursiveSummaryResult>(value)
                .map_err(|e| hearth_core::Error::validation(e.to_string()))
        }) {
            Ok(result) => return Ok(result.summary),
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(AgentError::ResponseValidation { attempts: MAX_RETRIES, last_error })
}

#[derive(Debug, serde::Deserialize)]
struct GenerateNewRecursiveSummaryResult {
    #[allow(dead_code)]
    analysis: String,
    summary: String,
}

