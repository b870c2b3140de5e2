//! Optional tool sets an agent can be created with (spec §4.4), grounded
//! in the original's `function_sets/optional/` package. `web_search` and
//! `demo` are implemented; `interpreter` (arbitrary code execution) is
//! not — letting the agent runtime execute attacker-influenced code is
//! outside what this repository signs up for.

pub mod demo;
pub mod web_search;

use std::sync::Arc;

use crate::error::ToolError;
use crate::tool::Tool;
use demo::EchoTool;
use web_search::{DuckDuckGoInstantAnswerTool, ScrapeWebpageTool};

/// Resolves the optional tool sets an agent was created with (spec §4's
/// `agents.optional_tool_sets` column) into tool instances, grounded in
/// the original's `FunctionSets.get_function_nodes` loader.
pub fn resolve_optional_tool_sets(names: &[String]) -> Result<Vec<Arc<dyn Tool>>, ToolError> {
    let mut tools: Vec<Arc<dyn Tool>> = Vec::new();
    for name in names {
        match name.as_str() {
            "web_search" => {
                tools.push(Arc::new(DuckDuckGoInstantAnswerTool::default()));
                tools.push(Arc::new(ScrapeWebpageTool::default()));
            },
            "demo" => tools.push(Arc::new(EchoTool)),
            other => return Err(ToolError::NotFound(format!("unknown optional tool set '{other}'"))),
        }
    }
    Ok(tools)
}
