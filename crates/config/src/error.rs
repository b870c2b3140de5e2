use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable '{0}'")]
    MissingVar(String),

    #[error("environment variable '{name}' has invalid value '{value}': {reason}")]
    InvalidVar { name: String, value: String, reason: String },

    #[error("failed to read backend config file '{path}': {source}")]
    BackendFile { path: String, source: std::io::Error },

    #[error("failed to parse backend config: {0}")]
    BackendParse(#[from] serde_yaml::Error),
}
