use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("scylla connection error: {0}")]
    Connection(String),

    #[error("scylla query error: {0}")]
    Query(String),

    #[error("row decode error: {0}")]
    Decode(String),

    #[error("agent {0} not found")]
    AgentNotFound(uuid::Uuid),

    #[error("{0} is empty")]
    Empty(&'static str),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<PersistenceError> for hearth_core::Error {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::AgentNotFound(id) => {
                hearth_core::Error::missing(format!("agent {id} not found"))
            }
            PersistenceError::Empty(what) => hearth_core::Error::missing(what.to_string()),
            other => hearth_core::Error::BackendFailure(other.to_string()),
        }
    }
}
