//! Composes the always-present base tool set with the optional sets an
//! agent was created with (spec §4.4), rejecting duplicate names the way
//! the original's `function_sets.py` loader did.

use std::collections::HashMap;
use std::sync::Arc;

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::error::ToolError;
use crate::schema::ToolSchema;
use crate::tool::Tool;

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Builds a registry from the base set plus every tool in `optional`,
    /// erroring on the first duplicate name encountered.
    pub fn new(base: Vec<Arc<dyn Tool>>, optional: Vec<Arc<dyn Tool>>) -> Result<Self, ToolError> {
        let mut tools = HashMap::new();
        for tool in base.into_iter().chain(optional) {
            let name = tool.name().to_string();
            if tools.insert(name.clone(), tool).is_some() {
                return Err(ToolError::DuplicateName(name));
            }
        }
        Ok(Self { tools })
    }

    pub fn list_tools(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Validates `arguments` against the named tool's schema, then runs it.
    pub async fn execute(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let tool = self.get(name).ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let schema = tool.schema().input_schema;
        let compiled = JSONSchema::compile(&schema)
            .map_err(|e| ToolError::ExecutionFailed(format!("invalid schema for '{name}': {e}")))?;
        if let Err(errors) = compiled.validate(&arguments) {
            let messages: Vec<String> = errors.map(|e| e.to_string()).collect();
            return Err(ToolError::invalid_params(messages.join("; ")));
        }

        tool.execute(arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::InputSchema;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes input"
        }
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.name().to_string(),
                description: self.description().to_string(),
                input_schema: InputSchema::object()
                    .property("text", crate::schema::PropertySchema::string("text to echo"), true)
                    .build(),
            }
        }
        async fn execute(&self, input: Value) -> Result<Value, ToolError> {
            Ok(input)
        }
    }

    #[test]
    fn duplicate_tool_names_rejected() {
        let err = ToolRegistry::new(vec![Arc::new(Echo), Arc::new(Echo)], vec![]);
        assert!(matches!(err, Err(ToolError::DuplicateName(_))));
    }

    #[tokio::test]
    async fn unknown_tool_errors() {
        let registry = ToolRegistry::new(vec![], vec![]).unwrap();
        let err = registry.execute("nope", Value::Null).await;
        assert!(matches!(err, Err(ToolError::NotFound(_))));
    }

    #[tokio::test]
    async fn missing_required_argument_rejected_before_execute() {
        let registry = ToolRegistry::new(vec![Arc::new(Echo)], vec![]).unwrap();
        let err = registry.execute("echo", serde_json::json!({})).await;
        assert!(matches!(err, Err(ToolError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn valid_call_executes() {
        let registry = ToolRegistry::new(vec![Arc::new(Echo)], vec![]).unwrap();
        let out = registry.execute("echo", serde_json::json!({"text": "hi"})).await.unwrap();
        assert_eq!(out["text"], "hi");
    }
}
