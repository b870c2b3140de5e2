//! Everything an axum handler needs, assembled once in `main` and cloned
//! (cheaply, behind `Arc`s) into every request.

use std::sync::Arc;

use hearth_config::RuntimeConfig;
use hearth_core::traits::{LanguageModel, RelationalStore, Tokenizer, VectorStore};

use crate::supervisor::Supervisor;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RelationalStore>,
    pub vector: Arc<dyn VectorStore>,
    pub llm: Arc<dyn LanguageModel>,
    pub tokenizer: Arc<dyn Tokenizer>,
    pub config: Arc<RuntimeConfig>,
    pub supervisor: Arc<Supervisor>,
}
