//! `archival_insert`, `archival_search` — Archival Storage operations
//! (spec §4.1), grounded in the original's
//! `function_sets/base/archival_storage.py`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use hearth_core::traits::{ArchivalFragment, Tokenizer, VectorStore};
use hearth_core::AgentId;
use hearth_rag::split_into_chunks;

use crate::error::ToolError;
use crate::schema::{InputSchema, PropertySchema, ToolSchema};
use crate::tool::Tool;

pub struct ArchivalInsertTool {
    agent_id: AgentId,
    store: Arc<dyn VectorStore>,
    tokenizer: Arc<dyn Tokenizer>,
    chunk_max_tokens: usize,
}

impl ArchivalInsertTool {
    pub fn new(
        agent_id: AgentId,
        store: Arc<dyn VectorStore>,
        tokenizer: Arc<dyn Tokenizer>,
        chunk_max_tokens: usize,
    ) -> Self {
        Self { agent_id, store, tokenizer, chunk_max_tokens }
    }
}

#[derive(Debug, Deserialize)]
struct ArchivalInsertArgs {
    text: String,
    category: String,
}

#[async_trait]
impl Tool for ArchivalInsertTool {
    fn name(&self) -> &str {
        "archival_insert"
    }

    fn description(&self) -> &str {
        "Inserts text into Archival Storage."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property(
                    "text",
                    PropertySchema::string(
                        "Text to be inserted into archival storage. To be formatted such that it can be easily queried through vector search.",
                    ),
                    true,
                )
                .property(
                    "category",
                    PropertySchema::string(
                        "Category of information presented in the given text. Keep the number of categories low (so as not to make the categories too fine-grained) but not too low (to avoid overgeneralising the stored info).",
                    ),
                    true,
                )
                .build(),
        }
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: ArchivalInsertArgs = serde_json::from_value(input).map_err(|e| ToolError::invalid_params(e.to_string()))?;

        self.store
            .ensure_collection(self.agent_id)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        let fragments: Vec<ArchivalFragment> = split_into_chunks(&args.text, self.tokenizer.as_ref(), self.chunk_max_tokens)
            .into_iter()
            .map(|chunk| ArchivalFragment { text: chunk, category: Some(args.category.clone()) })
            .collect();

        self.store
            .insert(self.agent_id, fragments)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(json!(format!(
            "Successfully inserted text '{}' into Archival Storage with category '{}'",
            args.text, args.category
        )))
    }
}

pub struct ArchivalSearchTool {
    agent_id: AgentId,
    store: Arc<dyn VectorStore>,
}

impl ArchivalSearchTool {
    pub fn new(agent_id: AgentId, store: Arc<dyn VectorStore>) -> Self {
        Self { agent_id, store }
    }
}

#[derive(Debug, Deserialize)]
struct ArchivalSearchArgs {
    query: String,
    #[serde(default)]
    page: usize,
    category: Option<String>,
}

#[async_trait]
impl Tool for ArchivalSearchTool {
    fn name(&self) -> &str {
        "archival_search"
    }

    fn description(&self) -> &str {
        "Searches Archival Storage by text (vector search)."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property("query", PropertySchema::string("Search query. To be formatted for more effective vector search."), true)
                .property(
                    "page",
                    PropertySchema::integer(
                        "Result list page number. Defaults to 0. If you haven't found the target information from Archival Storage but are certain it's there, increment page number and try again.",
                    ),
                    false,
                )
                .property("category", PropertySchema::string("Category of information to limit search to."), false)
                .build(),
        }
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: ArchivalSearchArgs = serde_json::from_value(input).map_err(|e| ToolError::invalid_params(e.to_string()))?;

        let page_size = hearth_config::constants::pagination::PAGE_SIZE;
        let hits = self
            .store
            .search(self.agent_id, &args.query, args.category.as_deref(), args.page * page_size, page_size)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        let mut result_str = format!("Results for page {}:", args.page);
        for (res_no, hit) in hits.iter().enumerate() {
            result_str.push_str(&format!(
                "\n\nResult {} (Category '{}', Timestamp {}): {}",
                res_no + 1,
                hit.category.as_deref().unwrap_or("uncategorized"),
                hit.inserted_at.to_rfc3339(),
                hit.text
            ));
        }

        Ok(json!(result_str))
    }
}
