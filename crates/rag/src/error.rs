use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("qdrant error: {0}")]
    Qdrant(String),

    #[error("collection for agent {0} not found")]
    CollectionNotFound(uuid::Uuid),
}

impl From<RagError> for hearth_core::Error {
    fn from(err: RagError) -> Self {
        hearth_core::Error::BackendFailure(err.to_string())
    }
}
