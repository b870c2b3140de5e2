//! [`VectorStore`] implementation backed by Qdrant (spec §4.1's Archival
//! Storage tier, spec §6's "vector store (consumed)" interface).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, Filter, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use std::sync::Arc;
use uuid::Uuid;

use hearth_core::traits::{ArchivalFragment, ArchivalHit, VectorStore};
use hearth_core::AgentId;

use crate::embedding::{embed, DIMENSIONS};
use crate::error::RagError;

pub struct QdrantVectorStore {
    client: Arc<Qdrant>,
}

impl QdrantVectorStore {
    pub fn new(client: Qdrant) -> Self {
        Self { client: Arc::new(client) }
    }

    fn collection_name(agent_id: AgentId) -> String {
        format!("archival_{agent_id}")
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn ensure_collection(&self, agent_id: AgentId) -> hearth_core::Result<()> {
        let name = Self::collection_name(agent_id);
        let exists = self
            .client
            .collection_exists(&name)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&name)
                        .vectors_config(VectorParamsBuilder::new(DIMENSIONS as u64, Distance::Cosine)),
                )
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;
        }
        Ok(())
    }

    async fn insert(
        &self,
        agent_id: AgentId,
        fragments: Vec<ArchivalFragment>,
    ) -> hearth_core::Result<Vec<String>> {
        let name = Self::collection_name(agent_id);
        let now = Utc::now();

        let mut ids = Vec::with_capacity(fragments.len());
        let mut points = Vec::with_capacity(fragments.len());

        for fragment in fragments {
            let id = Uuid::new_v4();
            let vector = embed(&fragment.text);

            let mut payload = qdrant_client::Payload::new();
            payload.insert("text", fragment.text.clone());
            payload.insert("category", fragment.category.clone().unwrap_or_default());
            payload.insert("inserted_at", now.to_rfc3339());

            points.push(PointStruct::new(id.to_string(), vector, payload));
            ids.push(id.to_string());
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(&name, points))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(ids)
    }

    async fn search(
        &self,
        agent_id: AgentId,
        query: &str,
        category: Option<&str>,
        offset: usize,
        count: usize,
    ) -> hearth_core::Result<Vec<ArchivalHit>> {
        let name = Self::collection_name(agent_id);
        let query_vector = embed(query);

        let filter = category.map(|c| {
            Filter::must([qdrant_client::qdrant::Condition::matches("category", c.to_string())])
        });

        let mut builder = SearchPointsBuilder::new(&name, query_vector, (offset + count) as u64)
            .with_payload(true);
        if let Some(filter) = filter {
            builder = builder.filter(filter);
        }

        let response = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        let hits = response
            .result
            .into_iter()
            .skip(offset)
            .take(count)
            .map(|point| {
                let payload = point.payload;
                let text = payload.get("text").and_then(|v| v.as_str().cloned()).unwrap_or_default();
                let category = payload
                    .get("category")
                    .and_then(|v| v.as_str().cloned())
                    .filter(|s| !s.is_empty());
                let inserted_at = payload
                    .get("inserted_at")
                    .and_then(|v| v.as_str().cloned())
                    .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(Utc::now);

                let id = match point.id.and_then(|id| id.point_id_options) {
                    Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(u)) => u,
                    Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(n)) => n.to_string(),
                    None => String::new(),
                };

                ArchivalHit { id, text, category, inserted_at, score: point.score }
            })
            .collect();

        Ok(hits)
    }

    async fn drop_collection(&self, agent_id: AgentId) -> hearth_core::Result<()> {
        let name = Self::collection_name(agent_id);
        self.client
            .delete_collection(&name)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        Ok(())
    }
}

/// Lists every point in an agent's collection without a similarity query,
/// used by `conversation_search`-style callers that want raw counts rather
/// than ranked results (mirrors the original's `collection.count()`).
pub async fn count(client: &Qdrant, agent_id: AgentId) -> hearth_core::Result<usize> {
    let name = QdrantVectorStore::collection_name(agent_id);
    let response = client
        .count(CountPointsBuilder::new(&name).exact(true))
        .await
        .map_err(|e| RagError::Qdrant(e.to_string()))?;
    Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
}
