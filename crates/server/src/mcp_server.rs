//! MCP JSON-RPC server endpoint.
//!
//! Exposes one agent's tools over the standard MCP JSON-RPC 2.0 protocol
//! (spec §4.4's MCP exposure requirement), letting an external MCP client
//! drive the same `push_task`/`archival_search`/... tools the agent's own
//! heartbeat loop uses. Each request builds a fresh [`ToolRegistry`] for
//! the named agent rather than reusing one held across a run, since tool
//! access here is independent of whether a heartbeat run is active.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use hearth_core::AgentId;
use hearth_tools::mcp::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolExecutor};
use hearth_tools::ToolRegistry;

use crate::state::AppState;

/// `POST /mcp/:agent_id` — handles `tools/list` and `tools/call` for one
/// agent's tool set.
pub async fn handle_mcp_request(
    State(state): State<AppState>,
    Path(agent_id): Path<AgentId>,
    Json(request): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    let registry = match build_registry(&state, agent_id).await {
        Ok(registry) => registry,
        Err(message) => {
            return Json(JsonRpcResponse::error(
                request.id.clone(),
                JsonRpcError { code: -32000, message, data: None },
            ))
        },
    };

    let executor = ToolExecutor::new(Arc::new(registry));
    Json(executor.handle_request(request).await)
}

async fn build_registry(state: &AppState, agent_id: AgentId) -> Result<ToolRegistry, String> {
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let row = state.store.get_agent(agent_id).await.map_err(|e| e.to_string())?;
    let base = hearth_tools::base::base_tool_set(
        agent_id,
        state.store.clone(),
        state.vector.clone(),
        state.tokenizer.clone(),
        tx,
        state.config.chunk_max_tokens,
        state.config.persona_max_words,
    );
    let optional = hearth_tools::optional::resolve_optional_tool_sets(&row.optional_tool_sets).map_err(|e| e.to_string())?;
    ToolRegistry::new(base, optional).map_err(|e| e.to_string())
}
