//! MCP JSON-RPC 2.0 wire types, consumed from `mcp_server.rs`. Only the
//! `Text` content block survives the trim — this runtime has no image,
//! audio or resource output to report.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::ToolError;
use crate::registry::ToolRegistry;

pub mod methods {
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: Some(result), error: None }
    }

    pub fn error(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(RequestId::Number(0)),
            result: None,
            error: Some(error),
        }
    }

    pub fn from_tool_error(id: Option<RequestId>, err: ToolError) -> Self {
        let code = match err {
            ToolError::InvalidParams(_) => -32602,
            ToolError::NotFound(_) => -32601,
            ToolError::DuplicateName(_) | ToolError::ExecutionFailed(_) => -32000,
        };
        Self::error(id, JsonRpcError { code, message: err.to_string(), data: None })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolOutput {
    pub content: Vec<ContentBlock>,
    pub is_error: bool,
}

impl ToolOutput {
    fn ok(result: Value) -> Self {
        let text = match result {
            Value::String(s) => s,
            other => other.to_string(),
        };
        Self { content: vec![ContentBlock::Text { text }], is_error: false }
    }

    fn err(message: String) -> Self {
        Self { content: vec![ContentBlock::Text { text: message }], is_error: true }
    }
}

/// Thin MCP-facing wrapper over [`ToolRegistry`].
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let tools: Vec<Value> = self
            .registry
            .list_tools()
            .into_iter()
            .map(|t| serde_json::json!({ "name": t.name, "description": t.description, "inputSchema": t.input_schema }))
            .collect();

        JsonRpcResponse::success(id, serde_json::json!({ "tools": tools }))
    }

    pub async fn handle_tools_call(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let params: ToolCallParams = match request.params.clone() {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        request.id.clone(),
                        JsonRpcError { code: -32602, message: format!("invalid params: {e}"), data: None },
                    )
                },
            },
            None => {
                return JsonRpcResponse::error(
                    request.id.clone(),
                    JsonRpcError { code: -32602, message: "missing params for tools/call".to_string(), data: None },
                )
            },
        };

        let id = request.id.clone().unwrap_or(RequestId::Number(0));
        match self.registry.execute(&params.name, params.arguments).await {
            Ok(result) => {
                let output = ToolOutput::ok(result);
                JsonRpcResponse::success(id, serde_json::to_value(output).unwrap_or(Value::Null))
            },
            Err(tool_error) => {
                let output = ToolOutput::err(tool_error.to_string());
                JsonRpcResponse::success(id, serde_json::to_value(output).unwrap_or(Value::Null))
            },
        }
    }

    /// Dispatches a parsed JSON-RPC request to its method handler.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                request.id.clone(),
                JsonRpcError { code: -32600, message: "invalid request: jsonrpc must be \"2.0\"".to_string(), data: None },
            );
        }

        match request.method.as_str() {
            methods::TOOLS_LIST => self.handle_tools_list(request.id.clone().unwrap_or(RequestId::Number(0))),
            methods::TOOLS_CALL => self.handle_tools_call(&request).await,
            other => JsonRpcResponse::error(
                request.id.clone(),
                JsonRpcError { code: -32601, message: format!("method not found: {other}"), data: None },
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_rpc_request_parses() {
        let req: JsonRpcRequest = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).unwrap();
        assert_eq!(req.jsonrpc, "2.0");
        assert_eq!(req.method, "tools/list");
    }

    #[test]
    fn tool_call_params_parses() {
        let params: ToolCallParams =
            serde_json::from_str(r#"{"name":"push_task","arguments":{"task":"water plants"}}"#).unwrap();
        assert_eq!(params.name, "push_task");
    }

    #[tokio::test]
    async fn unknown_method_returns_method_not_found() {
        let registry = Arc::new(ToolRegistry::new(vec![], vec![]).unwrap());
        let executor = ToolExecutor::new(registry);
        let req = JsonRpcRequest { jsonrpc: "2.0".to_string(), id: Some(RequestId::Number(1)), method: "nope".to_string(), params: None };
        let resp = executor.handle_request(req).await;
        assert_eq!(resp.error.unwrap().code, -32601);
    }
}
