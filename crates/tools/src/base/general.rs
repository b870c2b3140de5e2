//! `send_message` — delivers a message to the user, grounded in the
//! original's `function_sets/base/general.py`. The original wrote a JSON
//! line across a `multiprocessing.Pipe`; here the worker's half of that
//! channel is a `tokio::sync::mpsc` sender carrying
//! [`hearth_core::events::WorkerEvent`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedSender;

use hearth_core::events::WorkerEvent;
use hearth_core::traits::RelationalStore;
use hearth_core::AgentId;

use crate::error::ToolError;
use crate::schema::{InputSchema, PropertySchema, ToolSchema};
use crate::tool::Tool;

pub struct SendMessageTool {
    agent_id: AgentId,
    store: Arc<dyn RelationalStore>,
    to_user: UnboundedSender<WorkerEvent>,
}

impl SendMessageTool {
    pub fn new(agent_id: AgentId, store: Arc<dyn RelationalStore>, to_user: UnboundedSender<WorkerEvent>) -> Self {
        Self { agent_id, store, to_user }
    }
}

#[derive(Debug, Deserialize)]
struct SendMessageArgs {
    message: String,
}

#[async_trait]
impl Tool for SendMessageTool {
    fn name(&self) -> &str {
        "send_message"
    }

    fn description(&self) -> &str {
        "Sends a message to the user. You usually shouldn't request heartbeats when calling this function."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property("message", PropertySchema::string("Message to be sent."), true)
                .build(),
        }
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: SendMessageArgs = serde_json::from_value(input).map_err(|e| ToolError::invalid_params(e.to_string()))?;

        self.store
            .append_chat_log(self.agent_id, &args.message, true)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        self.to_user
            .send(WorkerEvent::ToUser(args.message))
            .map_err(|_| ToolError::ExecutionFailed("worker event channel closed".to_string()))?;

        Ok(json!("Successfully sent message"))
    }
}
