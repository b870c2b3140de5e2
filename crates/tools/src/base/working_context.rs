//! `persona_append`, `persona_replace`, `push_task`, `pop_task` — edits to
//! Working Context (spec §4.1), grounded in the original's
//! `function_sets/base/working_context.py`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use hearth_core::traits::RelationalStore;
use hearth_core::AgentId;

use crate::error::ToolError;
use crate::schema::{InputSchema, PropertySchema, ToolSchema};
use crate::tool::Tool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Section {
    User,
    Agent,
}

fn section_label(section: &Section) -> &'static str {
    match section {
        Section::User => "User",
        Section::Agent => "Agent",
    }
}

async fn get_section(
    store: &dyn RelationalStore,
    agent_id: AgentId,
    section: &Section,
) -> Result<String, ToolError> {
    let result = match section {
        Section::User => store.get_user_persona(agent_id).await,
        Section::Agent => store.get_agent_persona(agent_id).await,
    };
    result.map_err(|e| ToolError::ExecutionFailed(e.to_string()))
}

async fn set_section(
    store: &dyn RelationalStore,
    agent_id: AgentId,
    section: &Section,
    persona_max_words: usize,
    new_value: &str,
) -> Result<(), ToolError> {
    let word_count = new_value.split_whitespace().count();
    if word_count > persona_max_words {
        return Err(ToolError::invalid_params(format!(
            "new persona too long (maximum length {persona_max_words}, requested length {word_count})"
        )));
    }

    let result = match section {
        Section::User => store.set_user_persona(agent_id, new_value).await,
        Section::Agent => store.set_agent_persona(agent_id, new_value).await,
    };
    result.map_err(|e| ToolError::ExecutionFailed(e.to_string()))
}

pub struct PersonaAppendTool {
    agent_id: AgentId,
    store: Arc<dyn RelationalStore>,
    persona_max_words: usize,
}

impl PersonaAppendTool {
    pub fn new(agent_id: AgentId, store: Arc<dyn RelationalStore>, persona_max_words: usize) -> Self {
        Self { agent_id, store, persona_max_words }
    }
}

#[derive(Debug, Deserialize)]
struct PersonaAppendArgs {
    section: Section,
    text: String,
}

#[async_trait]
impl Tool for PersonaAppendTool {
    fn name(&self) -> &str {
        "persona_append"
    }

    fn description(&self) -> &str {
        "Appends text to a persona section in Working Context."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property(
                    "section",
                    PropertySchema::enum_type(
                        "Persona section where the text will be appended to ('user' or 'agent').",
                        vec!["user".to_string(), "agent".to_string()],
                    ),
                    true,
                )
                .property("text", PropertySchema::string("Text to be appended to the given section."), true)
                .build(),
        }
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: PersonaAppendArgs = serde_json::from_value(input).map_err(|e| ToolError::invalid_params(e.to_string()))?;

        let current = get_section(self.store.as_ref(), self.agent_id, &args.section).await?;
        let updated = format!("{current}{}", args.text);
        set_section(self.store.as_ref(), self.agent_id, &args.section, self.persona_max_words, &updated).await?;

        Ok(json!(format!("Successfully updated {} Persona", section_label(&args.section))))
    }
}

pub struct PersonaReplaceTool {
    agent_id: AgentId,
    store: Arc<dyn RelationalStore>,
    persona_max_words: usize,
}

impl PersonaReplaceTool {
    pub fn new(agent_id: AgentId, store: Arc<dyn RelationalStore>, persona_max_words: usize) -> Self {
        Self { agent_id, store, persona_max_words }
    }
}

#[derive(Debug, Deserialize)]
struct PersonaReplaceArgs {
    section: Section,
    old_text: String,
    new_text: String,
}

#[async_trait]
impl Tool for PersonaReplaceTool {
    fn name(&self) -> &str {
        "persona_replace"
    }

    fn description(&self) -> &str {
        "Replaces text in a persona section in Working Context."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property(
                    "section",
                    PropertySchema::enum_type(
                        "Persona section in which the text will be replaced ('user' or 'agent').",
                        vec!["user".to_string(), "agent".to_string()],
                    ),
                    true,
                )
                .property("old_text", PropertySchema::string("Old text in the given section."), true)
                .property("new_text", PropertySchema::string("New text in the given section."), true)
                .build(),
        }
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: PersonaReplaceArgs = serde_json::from_value(input).map_err(|e| ToolError::invalid_params(e.to_string()))?;

        let current = get_section(self.store.as_ref(), self.agent_id, &args.section).await?;
        let updated = current.replace(&args.old_text, &args.new_text);
        set_section(self.store.as_ref(), self.agent_id, &args.section, self.persona_max_words, &updated).await?;

        Ok(json!(format!("Successfully updated {} Persona", section_label(&args.section))))
    }
}

pub struct PushTaskTool {
    agent_id: AgentId,
    store: Arc<dyn RelationalStore>,
}

impl PushTaskTool {
    pub fn new(agent_id: AgentId, store: Arc<dyn RelationalStore>) -> Self {
        Self { agent_id, store }
    }
}

#[derive(Debug, Deserialize)]
struct PushTaskArgs {
    task: String,
}

#[async_trait]
impl Tool for PushTaskTool {
    fn name(&self) -> &str {
        "push_task"
    }

    fn description(&self) -> &str {
        "Pushes a task to your Working Context's task queue."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property("task", PropertySchema::string("Task to be pushed."), true)
                .build(),
        }
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: PushTaskArgs = serde_json::from_value(input).map_err(|e| ToolError::invalid_params(e.to_string()))?;
        self.store
            .push_task(self.agent_id, &args.task)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(json!(format!("Successfully pushed task '{}' to task queue.", args.task)))
    }
}

pub struct PopTaskTool {
    agent_id: AgentId,
    store: Arc<dyn RelationalStore>,
}

impl PopTaskTool {
    pub fn new(agent_id: AgentId, store: Arc<dyn RelationalStore>) -> Self {
        Self { agent_id, store }
    }
}

#[async_trait]
impl Tool for PopTaskTool {
    fn name(&self) -> &str {
        "pop_task"
    }

    fn description(&self) -> &str {
        "Pops a task from your Working Context's task queue."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object().build(),
        }
    }

    async fn execute(&self, _input: Value) -> Result<Value, ToolError> {
        let popped = self
            .store
            .pop_task(self.agent_id)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        Ok(json!(format!("Successfully popped task '{popped}' from task queue.")))
    }
}
