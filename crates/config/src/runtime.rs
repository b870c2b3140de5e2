//! Typed runtime configuration, loaded once from the process environment.

use std::env;
use std::time::Duration;

use crate::constants::{context_window, heartbeat, memory, pagination};
use crate::error::ConfigError;

/// One named LLM backend: a base URL, an API key and the ordered list of
/// models to try against it, mirroring the original's `backends.yaml`
/// (spec §4.2's backend failover list).
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct BackendConfig {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub models: Vec<String>,
}

/// Everything the runtime needs to boot, assembled once in `main` and
/// shared (by reference or clone) across the workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub debug_mode: bool,

    pub ctx_window: usize,
    pub warn_frac: f64,
    pub flush_frac: f64,
    pub flush_tgt_frac: f64,
    pub fmin: usize,

    pub chunk_max_tokens: usize,
    pub persona_max_words: usize,

    pub overthink_n: usize,
    pub heartbeat_interval: Duration,

    pub page_size: usize,
    pub chat_log_page_size: usize,

    pub llm_backends: Vec<BackendConfig>,

    pub database_url: String,
    pub qdrant_url: String,
    pub tokenizer_path: String,

    pub bind_addr: String,
}

impl RuntimeConfig {
    /// Loads configuration from environment variables, falling back to the
    /// same defaults the original agent used (spec §2). `llm_backends` is
    /// read from the YAML file named by `BACKENDS_CONFIG_PATH` (default
    /// `backends.yaml`), matching the original's `backends.yaml` lookup.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backends_path = env::var("BACKENDS_CONFIG_PATH").unwrap_or_else(|_| "backends.yaml".to_string());
        let llm_backends = Self::load_backends(&backends_path)?;

        Ok(Self {
            debug_mode: env_bool("DEBUG_MODE", false)?,

            ctx_window: env_usize("CTX_WINDOW", context_window::CTX_WINDOW)?,
            warn_frac: env_f64("WARNING_TOK_FRAC", context_window::WARN_FRAC)?,
            flush_frac: env_f64("FLUSH_TOK_FRAC", context_window::FLUSH_FRAC)?,
            flush_tgt_frac: env_f64("FLUSH_TGT_TOK_FRAC", context_window::FLUSH_TGT_FRAC)?,
            fmin: env_usize("FLUSH_MIN_FIFO_QUEUE_LEN", context_window::FMIN)?,

            chunk_max_tokens: env_usize("CHUNK_MAX_TOKENS", memory::CHUNK_MAX_TOKENS)?,
            persona_max_words: env_usize("PERSONA_MAX_WORDS", memory::PERSONA_MAX_WORDS)?,

            overthink_n: env_usize("OVERTHINK_WARNING_HEARTBEAT_COUNT", heartbeat::OVERTHINK_N)?,
            heartbeat_interval: Duration::from_secs(
                60 * env_usize("HEARTBEAT_FREQUENCY_IN_MINUTES", heartbeat::HEARTBEAT_INTERVAL_MIN as usize)? as u64,
            ),

            page_size: env_usize("PAGE_SIZE", pagination::PAGE_SIZE)?,
            chat_log_page_size: env_usize("CHAT_LOG_PAGE_SIZE", pagination::CHAT_LOG_PAGE_SIZE)?,

            llm_backends,

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "scylla://127.0.0.1:9042/hearth".to_string()),
            qdrant_url: env::var("QDRANT_URL").unwrap_or_else(|_| "http://127.0.0.1:6334".to_string()),
            tokenizer_path: env::var("TOKENIZER_PATH").unwrap_or_else(|_| "tokenizer.json".to_string()),

            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        })
    }

    fn load_backends(path: &str) -> Result<Vec<BackendConfig>, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::BackendFile { path: path.to_string(), source })?;
        let backends: Vec<BackendConfig> = serde_yaml::from_str(&raw)?;
        Ok(backends)
    }
}

fn env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(v) => match v.trim().to_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(ConfigError::InvalidVar {
                name: name.to_string(),
                value: other.to_string(),
                reason: "expected true/false".to_string(),
            }),
        },
    }
}

fn env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(v) => v.trim().parse().map_err(|e| ConfigError::InvalidVar {
            name: name.to_string(),
            value: v,
            reason: format!("{e}"),
        }),
    }
}

fn env_f64(name: &str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(v) => v.trim().parse().map_err(|e| ConfigError::InvalidVar {
            name: name.to_string(),
            value: v,
            reason: format!("{e}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_backend_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "- name: primary\n  base_url: https://api.example.com/v1\n  api_key: secret\n  models: [\"big-model\", \"small-model\"]\n"
        )
        .unwrap();

        let backends = RuntimeConfig::load_backends(file.path().to_str().unwrap()).unwrap();
        assert_eq!(backends.len(), 1);
        assert_eq!(backends[0].models, vec!["big-model", "small-model"]);
    }

    #[test]
    fn missing_backend_file_errors() {
        let err = RuntimeConfig::load_backends("/nonexistent/path/backends.yaml");
        assert!(matches!(err, Err(ConfigError::BackendFile { .. })));
    }

    #[test]
    fn env_bool_rejects_garbage() {
        env::set_var("HEARTH_TEST_BOOL", "maybe");
        let err = env_bool("HEARTH_TEST_BOOL", false);
        env::remove_var("HEARTH_TEST_BOOL");
        assert!(err.is_err());
    }
}
