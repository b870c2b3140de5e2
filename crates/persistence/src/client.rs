//! Connection setup and schema provisioning.

use std::sync::Arc;

use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;

use crate::error::PersistenceError;

#[derive(Debug, Clone)]
pub struct ScyllaConfig {
    pub uri: String,
    pub keyspace: String,
    pub replication_factor: u32,
}

impl ScyllaConfig {
    pub fn from_url(url: &str) -> Self {
        let (uri, keyspace) = url
            .strip_prefix("scylla://")
            .and_then(|rest| rest.split_once('/'))
            .map(|(host, ks)| (host.to_string(), ks.to_string()))
            .unwrap_or_else(|| (url.to_string(), "hearth".to_string()));

        Self { uri, keyspace, replication_factor: 1 }
    }
}

#[derive(Clone)]
pub struct ScyllaClient {
    pub session: Arc<Session>,
    pub keyspace: String,
}

impl ScyllaClient {
    pub async fn connect(config: ScyllaConfig) -> Result<Self, PersistenceError> {
        let session = SessionBuilder::new()
            .known_node(&config.uri)
            .build()
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;

        tracing::info!(keyspace = %config.keyspace, "connected to scylla");

        Ok(Self { session: Arc::new(session), keyspace: config.keyspace })
    }

    /// Creates the keyspace and tables backing [`crate::store::ScyllaRelationalStore`]
    /// (spec §3) if they don't already exist.
    pub async fn ensure_schema(&self) -> Result<(), PersistenceError> {
        let ks = &self.keyspace;

        self.session
            .query_unpaged(
                format!(
                    "CREATE KEYSPACE IF NOT EXISTS {ks} WITH replication = \
                     {{'class': 'SimpleStrategy', 'replication_factor': 1}}"
                ),
                &[],
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        self.session
            .use_keyspace(ks, false)
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        for stmt in crate::schema::TABLE_STATEMENTS {
            self.session
                .query_unpaged(*stmt, &[])
                .await
                .map_err(|e| PersistenceError::Query(e.to_string()))?;
        }

        Ok(())
    }
}
