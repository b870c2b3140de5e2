//! `chat_log_search`, `chat_log_search_by_date` — Chat Log lookups
//! (spec §4.1), grounded in the original's
//! `function_sets/base/chat_log.py`. Pages run newest-to-oldest (higher
//! page numbers yield older messages); within a page, results are shown
//! oldest to newest.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use hearth_core::traits::{ChatLogRow, RelationalStore};
use hearth_core::AgentId;

use crate::error::ToolError;
use crate::schema::{InputSchema, PropertySchema, ToolSchema};
use crate::tool::Tool;

fn format_page(page: usize, rows: &[ChatLogRow]) -> String {
    let mut result_str = format!("Results for page {page}:");
    if rows.is_empty() {
        result_str.push_str(" (no messages)");
        return result_str;
    }

    for (res_no, row) in rows.iter().rev().enumerate() {
        let kind = if row.from_assistant { "assistant" } else { "user" };
        result_str.push_str(&format!(
            "\n\nResult {} ({kind} message, timestamp {}): {}",
            res_no + 1,
            row.timestamp.to_rfc3339(),
            row.message
        ));
    }
    result_str
}

pub struct ChatLogSearchTool {
    agent_id: AgentId,
    store: Arc<dyn RelationalStore>,
}

impl ChatLogSearchTool {
    pub fn new(agent_id: AgentId, store: Arc<dyn RelationalStore>) -> Self {
        Self { agent_id, store }
    }
}

#[derive(Debug, Deserialize)]
struct ChatLogSearchArgs {
    #[serde(default)]
    query: String,
    #[serde(default)]
    page: usize,
}

#[async_trait]
impl Tool for ChatLogSearchTool {
    fn name(&self) -> &str {
        "chat_log_search"
    }

    fn description(&self) -> &str {
        "Queries recent messages (oldest to newest within page, higher pages yield older messages) from Chat Log. Optionally filters by text (exact match)."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property(
                    "query",
                    PropertySchema::string("Optional search query. Exact match (case-insensitive) required for result to show up."),
                    false,
                )
                .property("page", PropertySchema::integer("Result list page number."), false)
                .build(),
        }
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: ChatLogSearchArgs = serde_json::from_value(input).map_err(|e| ToolError::invalid_params(e.to_string()))?;
        let rows = self
            .store
            .search_chat_log(self.agent_id, &args.query, args.page)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(json!(format_page(args.page, &rows)))
    }
}

pub struct ChatLogSearchByDateTool {
    agent_id: AgentId,
    store: Arc<dyn RelationalStore>,
}

impl ChatLogSearchByDateTool {
    pub fn new(agent_id: AgentId, store: Arc<dyn RelationalStore>) -> Self {
        Self { agent_id, store }
    }
}

#[derive(Debug, Deserialize)]
struct ChatLogSearchByDateArgs {
    start_timestamp: DateTime<Utc>,
    end_timestamp: DateTime<Utc>,
    #[serde(default)]
    page: usize,
}

#[async_trait]
impl Tool for ChatLogSearchByDateTool {
    fn name(&self) -> &str {
        "chat_log_search_by_date"
    }

    fn description(&self) -> &str {
        "Searches Chat Log by datetime range (oldest to newest within page, higher pages yield older messages)."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property("start_timestamp", PropertySchema::string("Starting timestamp (must conform to ISO 8601 format)"), true)
                .property("end_timestamp", PropertySchema::string("Ending timestamp (must conform to ISO 8601 format)"), true)
                .property("page", PropertySchema::integer("Result list page number."), false)
                .build(),
        }
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: ChatLogSearchByDateArgs =
            serde_json::from_value(input).map_err(|e| ToolError::invalid_params(e.to_string()))?;
        let rows = self
            .store
            .search_chat_log_by_date(self.agent_id, args.start_timestamp, args.end_timestamp, args.page)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(json!(format_page(args.page, &rows)))
    }
}
