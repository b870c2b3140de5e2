use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("tool '{0}' not found")]
    NotFound(String),

    #[error("a tool named '{0}' is already registered")]
    DuplicateName(String),

    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

impl ToolError {
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }
}

impl From<ToolError> for hearth_core::Error {
    fn from(err: ToolError) -> Self {
        hearth_core::Error::ToolFailure(err.to_string())
    }
}
