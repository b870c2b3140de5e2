//! [`RelationalStore`] implementation backed by the client in [`crate::client`].
//!
//! Row order for `recall_storage`, `fifo_queue` and `chat_log` comes for
//! free from each table's `timeuuid` clustering key; `search_*` and
//! `*_by_date` fetch the full per-agent partition and filter/paginate in
//! process, the same way the original agent queried SQLite and filtered
//! in Python — a per-agent partition is small enough that this is not a
//! scalability concern for a single long-lived conversational agent.

use chrono::{DateTime, Utc};
use scylla::client::session::Session;
use scylla::value::CqlTimeuuid;
use std::sync::Arc;
use uuid::Uuid;

use async_trait::async_trait;
use hearth_core::traits::{AgentRow, ChatLogRow, RelationalStore};
use hearth_core::{AgentId, Message};

use crate::client::ScyllaClient;
use crate::error::PersistenceError;
use crate::schema::defaults;

pub struct ScyllaRelationalStore {
    session: Arc<Session>,
}

impl ScyllaRelationalStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { session: client.session }
    }

    fn now_timeuuid() -> CqlTimeuuid {
        CqlTimeuuid::from(Uuid::now_v1(&[0, 1, 2, 3, 4, 5]))
    }

    async fn append_ordered(
        &self,
        table: &str,
        agent_id: AgentId,
        message: &Message,
    ) -> Result<(), PersistenceError> {
        let repr = message.to_intermediate_repr();
        let content = serde_json::to_string(repr.get("content").unwrap_or(&serde_json::Value::Null))?;
        let message_type = repr["message_type"].as_str().unwrap_or_default().to_string();

        let query = format!(
            "INSERT INTO {table} (agent_id, id, message_type, timestamp, content) VALUES (?, ?, ?, ?, ?)"
        );
        self.session
            .query_unpaged(
                query,
                (agent_id, Self::now_timeuuid(), message_type, message.timestamp, content),
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;
        Ok(())
    }

    async fn fetch_ordered(&self, table: &str, agent_id: AgentId) -> Result<Vec<Message>, PersistenceError> {
        let query = format!("SELECT message_type, timestamp, content FROM {table} WHERE agent_id = ?");
        let rows = self
            .session
            .query_unpaged(query, (agent_id,))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?
            .into_rows_result()
            .map_err(|e| PersistenceError::Decode(e.to_string()))?
            .rows::<(String, DateTime<Utc>, String)>()
            .map_err(|e| PersistenceError::Decode(e.to_string()))?;

        let mut out = Vec::new();
        for row in rows {
            let (message_type, timestamp, content) =
                row.map_err(|e| PersistenceError::Decode(e.to_string()))?;
            let content: serde_json::Value = serde_json::from_str(&content)?;
            let repr = serde_json::json!({
                "message_type": message_type,
                "timestamp": timestamp.to_rfc3339(),
                "content": content,
            });
            out.push(Message::from_intermediate_repr(&repr).map_err(|e| PersistenceError::Decode(e.to_string()))?);
        }
        Ok(out)
    }
}

#[async_trait]
impl RelationalStore for ScyllaRelationalStore {
    async fn create_agent(&self, optional_tool_sets: Vec<String>) -> hearth_core::Result<AgentRow> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        self.session
            .query_unpaged(
                "INSERT INTO agents (id, optional_tool_sets, created_at, recursive_summary, recursive_summary_update_time) VALUES (?, ?, ?, ?, ?)",
                (id, optional_tool_sets.clone(), created_at, defaults::RECURSIVE_SUMMARY, created_at),
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        self.session
            .query_unpaged(
                "INSERT INTO working_context (agent_id, agent_persona, user_persona, tasks) VALUES (?, ?, ?, ?)",
                (id, defaults::AGENT_PERSONA, defaults::USER_PERSONA, Vec::<String>::new()),
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        Ok(AgentRow {
            id,
            optional_tool_sets,
            created_at,
            recursive_summary: defaults::RECURSIVE_SUMMARY.to_string(),
            recursive_summary_update_time: created_at,
        })
    }

    async fn get_agent(&self, id: AgentId) -> hearth_core::Result<AgentRow> {
        let rows = self
            .session
            .query_unpaged(
                "SELECT optional_tool_sets, created_at, recursive_summary, recursive_summary_update_time FROM agents WHERE id = ?",
                (id,),
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?
            .into_rows_result()
            .map_err(|e| PersistenceError::Decode(e.to_string()))?
            .rows::<(Vec<String>, DateTime<Utc>, String, DateTime<Utc>)>()
            .map_err(|e| PersistenceError::Decode(e.to_string()))?;

        for row in rows {
            let (optional_tool_sets, created_at, recursive_summary, recursive_summary_update_time) =
                row.map_err(|e| PersistenceError::Decode(e.to_string()))?;
            return Ok(AgentRow {
                id,
                optional_tool_sets,
                created_at,
                recursive_summary,
                recursive_summary_update_time,
            });
        }
        Err(PersistenceError::AgentNotFound(id).into())
    }

    async fn list_agents(&self) -> hearth_core::Result<Vec<AgentRow>> {
        let rows = self
            .session
            .query_unpaged(
                "SELECT id, optional_tool_sets, created_at, recursive_summary, recursive_summary_update_time FROM agents",
                &[],
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?
            .into_rows_result()
            .map_err(|e| PersistenceError::Decode(e.to_string()))?
            .rows::<(Uuid, Vec<String>, DateTime<Utc>, String, DateTime<Utc>)>()
            .map_err(|e| PersistenceError::Decode(e.to_string()))?;

        let mut out = Vec::new();
        for row in rows {
            let (id, optional_tool_sets, created_at, recursive_summary, recursive_summary_update_time) =
                row.map_err(|e| PersistenceError::Decode(e.to_string()))?;
            out.push(AgentRow { id, optional_tool_sets, created_at, recursive_summary, recursive_summary_update_time });
        }
        Ok(out)
    }

    async fn delete_agent(&self, id: AgentId) -> hearth_core::Result<()> {
        self.session
            .query_unpaged("DELETE FROM agents WHERE id = ?", (id,))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        for table in ["working_context", "recall_storage", "fifo_queue", "chat_log"] {
            let query = format!("DELETE FROM {table} WHERE agent_id = ?");
            self.session
                .query_unpaged(query, (id,))
                .await
                .map_err(|e| PersistenceError::Query(e.to_string()))?;
        }
        Ok(())
    }

    async fn update_recursive_summary(&self, id: AgentId, summary: &str) -> hearth_core::Result<()> {
        self.session
            .query_unpaged(
                "UPDATE agents SET recursive_summary = ?, recursive_summary_update_time = ? WHERE id = ?",
                (summary, Utc::now(), id),
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;
        Ok(())
    }

    async fn get_agent_persona(&self, id: AgentId) -> hearth_core::Result<String> {
        self.get_working_context_field(id, "agent_persona").await
    }

    async fn get_user_persona(&self, id: AgentId) -> hearth_core::Result<String> {
        self.get_working_context_field(id, "user_persona").await
    }

    async fn set_agent_persona(&self, id: AgentId, persona: &str) -> hearth_core::Result<()> {
        self.session
            .query_unpaged("UPDATE working_context SET agent_persona = ? WHERE agent_id = ?", (persona, id))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;
        Ok(())
    }

    async fn set_user_persona(&self, id: AgentId, persona: &str) -> hearth_core::Result<()> {
        self.session
            .query_unpaged("UPDATE working_context SET user_persona = ? WHERE agent_id = ?", (persona, id))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;
        Ok(())
    }

    async fn get_tasks(&self, id: AgentId) -> hearth_core::Result<Vec<String>> {
        let rows = self
            .session
            .query_unpaged("SELECT tasks FROM working_context WHERE agent_id = ?", (id,))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?
            .into_rows_result()
            .map_err(|e| PersistenceError::Decode(e.to_string()))?
            .rows::<(Option<Vec<String>>,)>()
            .map_err(|e| PersistenceError::Decode(e.to_string()))?;

        for row in rows {
            let (tasks,) = row.map_err(|e| PersistenceError::Decode(e.to_string()))?;
            return Ok(tasks.unwrap_or_default());
        }
        Err(PersistenceError::AgentNotFound(id).into())
    }

    async fn push_task(&self, id: AgentId, task: &str) -> hearth_core::Result<()> {
        let mut tasks = self.get_tasks(id).await?;
        tasks.push(task.to_string());
        self.session
            .query_unpaged("UPDATE working_context SET tasks = ? WHERE agent_id = ?", (tasks, id))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;
        Ok(())
    }

    async fn pop_task(&self, id: AgentId) -> hearth_core::Result<String> {
        let mut tasks = self.get_tasks(id).await?;
        if tasks.is_empty() {
            return Err(PersistenceError::Empty("task queue").into());
        }
        let task = tasks.remove(0);
        self.session
            .query_unpaged("UPDATE working_context SET tasks = ? WHERE agent_id = ?", (tasks, id))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;
        Ok(task)
    }

    async fn append_recall(&self, id: AgentId, message: &Message) -> hearth_core::Result<()> {
        self.append_ordered("recall_storage", id, message).await?;
        Ok(())
    }

    async fn search_recall(&self, id: AgentId, query: &str, page: usize) -> hearth_core::Result<Vec<Message>> {
        let all = self.fetch_ordered("recall_storage", id).await?;
        Ok(paginate_text_search(all, query, page, hearth_config_page_size()))
    }

    async fn search_recall_by_date(
        &self,
        id: AgentId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: usize,
    ) -> hearth_core::Result<Vec<Message>> {
        let all = self.fetch_ordered("recall_storage", id).await?;
        Ok(paginate_date_range(all, start, end, page, hearth_config_page_size()))
    }

    async fn push_fifo(&self, id: AgentId, message: &Message) -> hearth_core::Result<()> {
        self.append_ordered("fifo_queue", id, message).await?;
        Ok(())
    }

    async fn peek_fifo(&self, id: AgentId) -> hearth_core::Result<Message> {
        let mut all = self.fetch_ordered("fifo_queue", id).await?;
        if all.is_empty() {
            return Err(PersistenceError::Empty("fifo queue").into());
        }
        Ok(all.remove(0))
    }

    async fn pop_fifo(&self, id: AgentId) -> hearth_core::Result<Message> {
        let rows = self
            .session
            .query_unpaged("SELECT id, message_type, timestamp, content FROM fifo_queue WHERE agent_id = ? LIMIT 1", (id,))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?
            .into_rows_result()
            .map_err(|e| PersistenceError::Decode(e.to_string()))?
            .rows::<(CqlTimeuuid, String, DateTime<Utc>, String)>()
            .map_err(|e| PersistenceError::Decode(e.to_string()))?;

        for row in rows {
            let (row_id, message_type, timestamp, content) =
                row.map_err(|e| PersistenceError::Decode(e.to_string()))?;
            self.session
                .query_unpaged("DELETE FROM fifo_queue WHERE agent_id = ? AND id = ?", (id, row_id))
                .await
                .map_err(|e| PersistenceError::Query(e.to_string()))?;

            let content: serde_json::Value = serde_json::from_str(&content)?;
            let repr = serde_json::json!({
                "message_type": message_type,
                "timestamp": timestamp.to_rfc3339(),
                "content": content,
            });
            return Message::from_intermediate_repr(&repr).map_err(Into::into);
        }
        Err(PersistenceError::Empty("fifo queue").into())
    }

    async fn fifo_len(&self, id: AgentId) -> hearth_core::Result<usize> {
        Ok(self.fetch_ordered("fifo_queue", id).await?.len())
    }

    async fn fifo_messages(&self, id: AgentId) -> hearth_core::Result<Vec<Message>> {
        Ok(self.fetch_ordered("fifo_queue", id).await?)
    }

    async fn append_chat_log(&self, id: AgentId, message: &str, from_assistant: bool) -> hearth_core::Result<()> {
        self.session
            .query_unpaged(
                "INSERT INTO chat_log (agent_id, id, timestamp, message, from_assistant) VALUES (?, ?, ?, ?, ?)",
                (id, Self::now_timeuuid(), Utc::now(), message, from_assistant),
            )
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;
        Ok(())
    }

    async fn search_chat_log(&self, id: AgentId, query: &str, page: usize) -> hearth_core::Result<Vec<ChatLogRow>> {
        let all = self.fetch_chat_log(id).await?;
        let needle = query.to_lowercase();
        let mut filtered: Vec<_> = all.into_iter().filter(|r| query.is_empty() || r.message.to_lowercase().contains(&needle)).collect();
        filtered.reverse();
        Ok(paginate_rows(filtered, page, hearth_config_page_size()))
    }

    async fn search_chat_log_by_date(
        &self,
        id: AgentId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: usize,
    ) -> hearth_core::Result<Vec<ChatLogRow>> {
        let all = self.fetch_chat_log(id).await?;
        let mut filtered: Vec<_> = all.into_iter().filter(|r| r.timestamp >= start && r.timestamp <= end).collect();
        filtered.reverse();
        Ok(paginate_rows(filtered, page, hearth_config_page_size()))
    }
}

impl ScyllaRelationalStore {
    async fn get_working_context_field(&self, id: AgentId, column: &str) -> hearth_core::Result<String> {
        let query = format!("SELECT {column} FROM working_context WHERE agent_id = ?");
        let rows = self
            .session
            .query_unpaged(query, (id,))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?
            .into_rows_result()
            .map_err(|e| PersistenceError::Decode(e.to_string()))?
            .rows::<(Option<String>,)>()
            .map_err(|e| PersistenceError::Decode(e.to_string()))?;

        for row in rows {
            let (value,) = row.map_err(|e| PersistenceError::Decode(e.to_string()))?;
            return Ok(value.unwrap_or_default());
        }
        Err(PersistenceError::AgentNotFound(id).into())
    }

    async fn fetch_chat_log(&self, id: AgentId) -> Result<Vec<ChatLogRow>, PersistenceError> {
        let rows = self
            .session
            .query_unpaged("SELECT timestamp, message, from_assistant FROM chat_log WHERE agent_id = ?", (id,))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?
            .into_rows_result()
            .map_err(|e| PersistenceError::Decode(e.to_string()))?
            .rows::<(DateTime<Utc>, String, bool)>()
            .map_err(|e| PersistenceError::Decode(e.to_string()))?;

        let mut out = Vec::new();
        for (idx, row) in rows.enumerate() {
            let (timestamp, message, from_assistant) = row.map_err(|e| PersistenceError::Decode(e.to_string()))?;
            out.push(ChatLogRow { id: idx as i64, timestamp, message, from_assistant });
        }
        Ok(out)
    }
}

fn hearth_config_page_size() -> usize {
    hearth_config::constants::pagination::PAGE_SIZE
}

/// Spec §4.1: Recall's `text_search`/`date_search` return newest-first, so
/// the oldest-first rows `fetch_ordered` yields are reversed before paging
/// (matching `search_chat_log`/`search_chat_log_by_date`'s ordering below).
fn paginate_text_search(all: Vec<Message>, query: &str, page: usize, page_size: usize) -> Vec<Message> {
    let needle = query.to_lowercase();
    let mut filtered: Vec<Message> = all
        .into_iter()
        .filter(|m| {
            if needle.is_empty() {
                return true;
            }
            let repr = m.to_intermediate_repr();
            repr.to_string().to_lowercase().contains(&needle)
        })
        .collect();
    filtered.reverse();
    paginate_rows(filtered, page, page_size)
}

fn paginate_date_range(
    all: Vec<Message>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    page: usize,
    page_size: usize,
) -> Vec<Message> {
    let mut filtered: Vec<Message> = all.into_iter().filter(|m| m.timestamp >= start && m.timestamp <= end).collect();
    filtered.reverse();
    paginate_rows(filtered, page, page_size)
}

fn paginate_rows<T>(all: Vec<T>, page: usize, page_size: usize) -> Vec<T> {
    let offset = page.saturating_mul(page_size).min(all.len());
    all.into_iter().skip(offset).take(page_size).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_rows_slices_by_page() {
        let rows: Vec<i32> = (0..12).collect();
        assert_eq!(paginate_rows(rows.clone(), 0, 5), vec![0, 1, 2, 3, 4]);
        assert_eq!(paginate_rows(rows.clone(), 1, 5), vec![5, 6, 7, 8, 9]);
        assert_eq!(paginate_rows(rows.clone(), 2, 5), vec![10, 11]);
        assert_eq!(paginate_rows(rows, 3, 5), Vec::<i32>::new());
    }

    #[test]
    fn paginate_text_search_filters_case_insensitively() {
        let ts = Utc::now();
        let msgs = vec![Message::user("Hello World", ts), Message::user("goodbye", ts)];
        let hits = paginate_text_search(msgs, "hello", 0, 5);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn paginate_date_range_filters_by_bounds() {
        let early = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let late = DateTime::parse_from_rfc3339("2026-06-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let msgs = vec![Message::user("a", early), Message::user("b", late)];
        let hits = paginate_date_range(msgs, early, early, 0, 5);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn paginate_text_search_orders_newest_first() {
        let early = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let mid = DateTime::parse_from_rfc3339("2026-03-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let late = DateTime::parse_from_rfc3339("2026-06-01T00:00:00Z").unwrap().with_timezone(&Utc);
        // `fetch_ordered` always yields oldest-first; the helper must reverse.
        let msgs = vec![Message::user("match one", early), Message::user("match two", mid), Message::user("match three", late)];
        let hits = paginate_text_search(msgs, "match", 0, 5);
        assert_eq!(hits[0].timestamp, late);
        assert_eq!(hits[1].timestamp, mid);
        assert_eq!(hits[2].timestamp, early);
    }

    #[test]
    fn paginate_date_range_orders_newest_first() {
        let early = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let late = DateTime::parse_from_rfc3339("2026-06-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let msgs = vec![Message::user("a", early), Message::user("b", late)];
        let hits = paginate_date_range(msgs, early, late, 0, 5);
        assert_eq!(hits[0].timestamp, late);
        assert_eq!(hits[1].timestamp, early);
    }
}
