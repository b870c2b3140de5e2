//! The `Tool` trait every function-set member implements.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ToolError;
use crate::schema::ToolSchema;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> ToolSchema;

    async fn execute(&self, input: Value) -> Result<Value, ToolError>;

    /// Seconds the heartbeat loop waits before treating this call as hung.
    fn timeout_secs(&self) -> u64 {
        30
    }
}
