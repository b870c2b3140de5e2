use thiserror::Error;

/// Errors surfaced while driving one agent's heartbeat loop, grounded in
/// spec §7's propagation policy: tool/schema errors stay local to the
/// loop (retried or turned into a `function_res` message), everything
/// else here is fatal to the current run and ends it with an `error`
/// event followed by `halt`.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Core(#[from] hearth_core::Error),

    #[error("assistant response did not validate after {attempts} attempts: {last_error}")]
    ResponseValidation { attempts: u32, last_error: String },

    #[error("tool execution failed: {0}")]
    Tool(#[from] hearth_tools::ToolError),

    #[error("the agent was halted")]
    Halted,
}
