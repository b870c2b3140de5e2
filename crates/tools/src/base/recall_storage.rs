//! `recall_search`, `recall_search_by_date` — Recall Storage lookups
//! (spec §4.1), grounded in the original's
//! `function_sets/base/recall_storage.py`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use hearth_core::traits::RelationalStore;
use hearth_core::AgentId;

use crate::error::ToolError;
use crate::schema::{InputSchema, PropertySchema, ToolSchema};
use crate::tool::Tool;

fn format_page(page: usize, messages: &[hearth_core::Message]) -> String {
    let mut result_str = format!("Results for page {page}:");
    for (res_no, message) in messages.iter().enumerate() {
        let repr = message.to_intermediate_repr();
        result_str.push_str(&format!("\n\nResult {}: {}", res_no + 1, repr));
    }
    result_str
}

pub struct RecallSearchTool {
    agent_id: AgentId,
    store: Arc<dyn RelationalStore>,
}

impl RecallSearchTool {
    pub fn new(agent_id: AgentId, store: Arc<dyn RelationalStore>) -> Self {
        Self { agent_id, store }
    }
}

#[derive(Debug, Deserialize)]
struct RecallSearchArgs {
    query_text: String,
    #[serde(default)]
    page: usize,
}

#[async_trait]
impl Tool for RecallSearchTool {
    fn name(&self) -> &str {
        "recall_search"
    }

    fn description(&self) -> &str {
        "Searches Recall Storage by text (exact match)."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property(
                    "query_text",
                    PropertySchema::string(
                        "Search query. Exact match (case-insensitive) required for result to show up.",
                    ),
                    true,
                )
                .property(
                    "page",
                    PropertySchema::integer(
                        "Result list page number. Defaults to 0. If you haven't found the target information from Recall Storage but are certain it's there, increment page number and try again.",
                    ),
                    false,
                )
                .build(),
        }
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: RecallSearchArgs = serde_json::from_value(input).map_err(|e| ToolError::invalid_params(e.to_string()))?;
        let messages = self
            .store
            .search_recall(self.agent_id, &args.query_text, args.page)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(json!(format_page(args.page, &messages)))
    }
}

pub struct RecallSearchByDateTool {
    agent_id: AgentId,
    store: Arc<dyn RelationalStore>,
}

impl RecallSearchByDateTool {
    pub fn new(agent_id: AgentId, store: Arc<dyn RelationalStore>) -> Self {
        Self { agent_id, store }
    }
}

#[derive(Debug, Deserialize)]
struct RecallSearchByDateArgs {
    start_timestamp: DateTime<Utc>,
    end_timestamp: DateTime<Utc>,
    #[serde(default)]
    page: usize,
}

#[async_trait]
impl Tool for RecallSearchByDateTool {
    fn name(&self) -> &str {
        "recall_search_by_date"
    }

    fn description(&self) -> &str {
        "Searches Recall Storage by datetime range."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property(
                    "start_timestamp",
                    PropertySchema::string("Starting timestamp (must conform to ISO 8601 format)"),
                    true,
                )
                .property(
                    "end_timestamp",
                    PropertySchema::string("Ending timestamp (must conform to ISO 8601 format)"),
                    true,
                )
                .property("page", PropertySchema::integer("Result list page number. Defaults to 0."), false)
                .build(),
        }
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: RecallSearchByDateArgs =
            serde_json::from_value(input).map_err(|e| ToolError::invalid_params(e.to_string()))?;
        let messages = self
            .store
            .search_recall_by_date(self.agent_id, args.start_timestamp, args.end_timestamp, args.page)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(json!(format_page(args.page, &messages)))
    }
}
