//! JSON-Schema builders for tool input validation, grounded in the
//! `InputSchema`/`PropertySchema` builder shape used throughout the
//! teacher's tool implementations.

use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone)]
pub struct PropertySchema(Value);

impl PropertySchema {
    pub fn string(description: impl Into<String>) -> Self {
        Self(json!({ "type": "string", "description": description.into() }))
    }

    pub fn integer(description: impl Into<String>) -> Self {
        Self(json!({ "type": "integer", "description": description.into() }))
    }

    pub fn boolean(description: impl Into<String>) -> Self {
        Self(json!({ "type": "boolean", "description": description.into() }))
    }

    pub fn enum_type(description: impl Into<String>, variants: Vec<String>) -> Self {
        Self(json!({ "type": "string", "description": description.into(), "enum": variants }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputSchema {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl InputSchema {
    pub fn object() -> Self {
        Self::default()
    }

    pub fn property(mut self, name: &str, schema: PropertySchema, required: bool) -> Self {
        self.properties.insert(name.to_string(), schema.0);
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    pub fn build(self) -> Value {
        json!({
            "type": "object",
            "properties": Value::Object(self.properties),
            "required": self.required,
        })
    }
}

impl From<InputSchema> for Value {
    fn from(schema: InputSchema) -> Self {
        schema.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_property_appears_in_required_list() {
        let schema: Value = InputSchema::object()
            .property("task", PropertySchema::string("a task"), true)
            .build();
        assert_eq!(schema["required"], json!(["task"]));
        assert_eq!(schema["properties"]["task"]["type"], "string");
    }
}
