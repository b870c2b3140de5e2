//! CQL table definitions for the relational tier (spec §3).
//!
//! `recall_storage`, `fifo_queue` and `chat_log` each cluster on a
//! `timeuuid` so row order reflects insertion order without a
//! separately-maintained counter.

pub const TABLE_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS agents (
        id uuid PRIMARY KEY,
        optional_tool_sets list<text>,
        created_at timestamp,
        recursive_summary text,
        recursive_summary_update_time timestamp
    )",
    "CREATE TABLE IF NOT EXISTS working_context (
        agent_id uuid PRIMARY KEY,
        agent_persona text,
        user_persona text,
        tasks list<text>
    )",
    "CREATE TABLE IF NOT EXISTS recall_storage (
        agent_id uuid,
        id timeuuid,
        message_type text,
        timestamp timestamp,
        content text,
        PRIMARY KEY (agent_id, id)
    ) WITH CLUSTERING ORDER BY (id ASC)",
    "CREATE TABLE IF NOT EXISTS fifo_queue (
        agent_id uuid,
        id timeuuid,
        message_type text,
        timestamp timestamp,
        content text,
        PRIMARY KEY (agent_id, id)
    ) WITH CLUSTERING ORDER BY (id ASC)",
    "CREATE TABLE IF NOT EXISTS chat_log (
        agent_id uuid,
        id timeuuid,
        timestamp timestamp,
        message text,
        from_assistant boolean,
        PRIMARY KEY (agent_id, id)
    ) WITH CLUSTERING ORDER BY (id ASC)",
];

/// Sentinel text stored in `agents.recursive_summary` and in the persona
/// columns of `working_context` for a freshly created agent, matching the
/// original schema's `DEFAULT` clauses.
pub mod defaults {
    pub const RECURSIVE_SUMMARY: &str = "(no summary yet)";
    pub const AGENT_PERSONA: &str = "(persona not yet set)";
    pub const USER_PERSONA: &str = "(nothing known about the user yet)";
}
