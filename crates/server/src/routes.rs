//! HTTP and WebSocket route handlers (spec §6's API surface).
//!
//! Thin by design: every handler either reads/writes straight through
//! [`AppState::store`]/[`AppState::vector`], or defers to
//! [`crate::supervisor::Supervisor`] for anything that touches a running
//! heartbeat loop.

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::{SinkExt, StreamExt};
use hearth_core::events::{SessionCommand, WorkerEvent};
use hearth_core::{AgentId, MessageKind};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::supervisor::SupervisorError;

const PERSONA_GEN_RETRIES: usize = 10;

#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    /// A free-form description of what this agent should be for. When
    /// present, a persona is drafted immediately (spec §4.5); when absent
    /// the agent starts with an empty Agent Persona.
    #[serde(default)]
    pub goals: Option<String>,
    #[serde(default)]
    pub optional_tool_sets: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub id: AgentId,
    pub optional_tool_sets: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<hearth_core::traits::AgentRow> for AgentResponse {
    fn from(row: hearth_core::traits::AgentRow) -> Self {
        Self { id: row.id, optional_tool_sets: row.optional_tool_sets, created_at: row.created_at }
    }
}

fn api_error(err: impl std::fmt::Display) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
}

/// `POST /agents` — creates an agent, drafting its persona first if
/// `goals` was given, grounded in `original_source/persona_gen.py`'s
/// one-shot persona-drafting run at creation time.
pub async fn create_agent(
    State(state): State<AppState>,
    Json(request): Json<CreateAgentRequest>,
) -> Response {
    let row = match state.store.create_agent(request.optional_tool_sets).await {
        Ok(row) => row,
        Err(e) => return api_error(e),
    };

    if let Some(goals) = request.goals {
        let persona = hearth_agent::persona::generate_persona(
            state.llm.as_ref(),
            &goals,
            state.config.persona_max_words,
            PERSONA_GEN_RETRIES,
        )
        .await;

        match persona {
            Ok(persona) => {
                if let Err(e) = state.store.set_agent_persona(row.id, &persona).await {
                    return api_error(e);
                }
            },
            Err(e) => return api_error(e),
        }
    }

    if let Err(e) = state.vector.ensure_collection(row.id).await {
        return api_error(e);
    }

    let row = match state.store.get_agent(row.id).await {
        Ok(row) => row,
        Err(e) => return api_error(e),
    };

    (StatusCode::CREATED, Json(AgentResponse::from(row))).into_response()
}

/// `GET /agents`
pub async fn list_agents(State(state): State<AppState>) -> Response {
    match state.store.list_agents().await {
        Ok(rows) => Json(rows.into_iter().map(AgentResponse::from).collect::<Vec<_>>()).into_response(),
        Err(e) => api_error(e),
    }
}

/// `GET /agents/:id`
pub async fn get_agent(State(state): State<AppState>, Path(agent_id): Path<AgentId>) -> Response {
    match state.store.get_agent(agent_id).await {
        Ok(row) => Json(AgentResponse::from(row)).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

/// `DELETE /agents/:id`
pub async fn delete_agent(State(state): State<AppState>, Path(agent_id): Path<AgentId>) -> Response {
    if let Err(e) = state.store.delete_agent(agent_id).await {
        return api_error(e);
    }
    if let Err(e) = state.vector.drop_collection(agent_id).await {
        return api_error(e);
    }
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Debug, Deserialize)]
pub struct SubmitInputRequest {
    /// `user` (the default) or `system` (spec §6's `kind` parameter).
    #[serde(default = "default_input_kind")]
    pub kind: MessageKind,
    pub message: String,
}

fn default_input_kind() -> MessageKind {
    MessageKind::User
}

/// `POST /agents/:id/input` — submits a `user` or `system` message and
/// starts the heartbeat loop. Returns `202 Accepted` immediately; the
/// caller opens `GET /agents/:id/session` to watch the run unfold (spec
/// §4.6, §6).
pub async fn submit_input(
    State(state): State<AppState>,
    Path(agent_id): Path<AgentId>,
    Json(request): Json<SubmitInputRequest>,
) -> Response {
    match state.supervisor.submit_input(agent_id, request.kind, request.message).await {
        Ok(_receiver) => StatusCode::ACCEPTED.into_response(),
        Err(SupervisorError::Busy(id)) => {
            (StatusCode::CONFLICT, format!("agent {id} already has a run in progress")).into_response()
        },
        Err(e) => api_error(e),
    }
}

/// `GET /agents/:id/session` — upgrades to a WebSocket that streams
/// [`WorkerEvent`]s for an in-flight run, and accepts `"halt"`/
/// `"halt_soon"` text frames to steer it (spec §4.6's `SessionCommand`).
pub async fn agent_session(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(agent_id): Path<AgentId>,
) -> Response {
    ws.on_upgrade(move |socket| handle_session(socket, state, agent_id))
}

async fn handle_session(socket: WebSocket, state: AppState, agent_id: AgentId) {
    let Some(mut events) = state.supervisor.subscribe(agent_id) else {
        let _ = socket.close().await;
        return;
    };

    let (mut sink, mut stream) = socket.split();
    let supervisor = state.supervisor.clone();

    let outbound = async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let halted = matches!(event, WorkerEvent::Halt);
                    let payload = serde_json::to_string(&worker_event_json(&event)).unwrap_or_default();
                    if sink.send(WsMessage::Text(payload)).await.is_err() {
                        break;
                    }
                    if halted {
                        break;
                    }
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    let inbound = async move {
        while let Some(Ok(message)) = stream.next().await {
            if let WsMessage::Text(text) = message {
                let command = match text.trim() {
                    "halt" => Some(SessionCommand::Halt),
                    "halt_soon" => Some(SessionCommand::HaltSoon),
                    _ => None,
                };
                if let Some(command) = command {
                    supervisor.send_command(agent_id, command);
                }
            }
        }
    };

    tokio::join!(outbound, inbound);
}

/// Spec §6: "message frames are JSON objects with a `message_type`
/// discriminator in {message, debug, error, to_user, halt, ping}".
fn worker_event_json(event: &WorkerEvent) -> serde_json::Value {
    match event {
        WorkerEvent::Message(value) => serde_json::json!({"message_type": "message", "value": value}),
        WorkerEvent::Debug(text) => serde_json::json!({"message_type": "debug", "text": text}),
        WorkerEvent::Error(text) => serde_json::json!({"message_type": "error", "text": text}),
        WorkerEvent::ToUser(text) => serde_json::json!({"message_type": "to_user", "text": text}),
        WorkerEvent::Halt => serde_json::json!({"message_type": "halt"}),
        WorkerEvent::Ping => serde_json::json!({"message_type": "ping"}),
    }
}
