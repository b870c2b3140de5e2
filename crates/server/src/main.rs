//! HTTP/WebSocket front door for the hearth agent runtime (spec §6).
//!
//! Boots the persistence, vector and LLM backends from
//! [`hearth_config::RuntimeConfig`], wires them into a [`supervisor::Supervisor`]
//! and an axum [`axum::Router`], and serves until the process is killed.

mod mcp_server;
mod routes;
mod state;
mod supervisor;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use hearth_config::RuntimeConfig;
use hearth_llm::{FailoverLanguageModel, HfTokenizer};
use hearth_persistence::ScyllaConfig;
use hearth_rag::QdrantVectorStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use state::AppState;
use supervisor::Supervisor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = RuntimeConfig::from_env()?;
    tracing::info!(bind_addr = %config.bind_addr, "loaded runtime configuration");

    let store = hearth_persistence::init(ScyllaConfig::from_url(&config.database_url)).await?;
    let store: Arc<dyn hearth_core::traits::RelationalStore> = Arc::new(store);

    let qdrant = qdrant_client::Qdrant::from_url(&config.qdrant_url).build()?;
    let vector: Arc<dyn hearth_core::traits::VectorStore> = Arc::new(QdrantVectorStore::new(qdrant));

    let llm: Arc<dyn hearth_core::traits::LanguageModel> =
        Arc::new(FailoverLanguageModel::new(config.llm_backends.clone()));
    let tokenizer: Arc<dyn hearth_core::traits::Tokenizer> = Arc::new(HfTokenizer::from_file(&config.tokenizer_path)?);

    let heartbeat_tuning = hearth_agent::HeartbeatConfig {
        system_prompt: String::new(),
        recursive_summary_prompt: String::new(),
        ctx_window: config.ctx_window,
        warn_frac: config.warn_frac,
        flush_frac: config.flush_frac,
        flush_tgt_frac: config.flush_tgt_frac,
        fmin: config.fmin,
        overthink_n: config.overthink_n,
        validation_retries: 3,
    };

    let supervisor = Arc::new(Supervisor::new(
        store.clone(),
        vector.clone(),
        llm.clone(),
        tokenizer.clone(),
        hearth_config::prompts::system_prompt(config.persona_max_words),
        hearth_config::prompts::RECURSIVE_SUMMARY_PROMPT.to_string(),
        heartbeat_tuning,
        config.chunk_max_tokens,
        config.persona_max_words,
    ));

    let bind_addr = config.bind_addr.clone();
    let state = AppState { store, vector, llm, tokenizer, config: Arc::new(config), supervisor };

    let app = Router::new()
        .route("/agents", post(routes::create_agent).get(routes::list_agents))
        .route("/agents/:id", get(routes::get_agent).delete(routes::delete_agent))
        .route("/agents/:id/input", post(routes::submit_input))
        .route("/agents/:id/session", get(routes::agent_session))
        .route("/mcp/:id", post(mcp_server::handle_mcp_request))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "hearth-server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
