//! Tool registry and function sets for the hearth agent runtime (spec §4.4).
//!
//! [`base::base_tool_set`] builds the always-present tools every agent
//! gets; [`optional::resolve_optional_tool_sets`] adds whichever named
//! sets the agent was created with. [`ToolRegistry`] composes the two
//! and validates/dispatches calls; [`mcp::ToolExecutor`] exposes the
//! same registry over MCP JSON-RPC.

pub mod base;
pub mod error;
pub mod mcp;
pub mod optional;
pub mod registry;
pub mod schema;
pub mod tool;

pub use error::ToolError;
pub use registry::ToolRegistry;
pub use schema::{InputSchema, PropertySchema, ToolSchema};
pub use tool::Tool;
