//! ScyllaDB-backed relational store for the hearth agent runtime.
//!
//! Provides the `agents`, `working_context`, `recall_storage`, `fifo_queue`
//! and `chat_log` tables (spec §3) behind [`hearth_core::traits::RelationalStore`].

pub mod client;
pub mod error;
pub mod schema;
pub mod store;

pub use client::{ScyllaClient, ScyllaConfig};
pub use error::PersistenceError;
pub use store::ScyllaRelationalStore;

/// Connects to ScyllaDB, provisions the schema if needed, and returns a
/// [`ScyllaRelationalStore`] ready to hand to `hearth-agent`.
pub async fn init(config: ScyllaConfig) -> Result<ScyllaRelationalStore, PersistenceError> {
    let client = ScyllaClient::connect(config).await?;
    client.ensure_schema().await?;
    Ok(ScyllaRelationalStore::new(client))
}
