//! A single `echo` tool exercising the optional-tool-set composition path
//! without claiming to implement a real external integration.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ToolError;
use crate::schema::{InputSchema, PropertySchema, ToolSchema};
use crate::tool::Tool;

#[derive(Default)]
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes the given text back unchanged."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object().property("text", PropertySchema::string("Text to echo back."), true).build(),
        }
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        Ok(input.get("text").cloned().unwrap_or(Value::Null))
    }
}
