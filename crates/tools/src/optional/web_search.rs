//! `duckduckgo_instant_answer`, `scrape_webpage` — an optional tool set
//! (spec §4.4), grounded in the original's
//! `function_sets/optional/web_search.py`. Agents only get these when
//! created with `"web_search"` in their optional tool sets.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::schema::{InputSchema, PropertySchema, ToolSchema};
use crate::tool::Tool;

pub struct DuckDuckGoInstantAnswerTool {
    http: reqwest::Client,
}

impl DuckDuckGoInstantAnswerTool {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Default for DuckDuckGoInstantAnswerTool {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
}

#[derive(Debug, Deserialize)]
struct InstantAnswerResponse {
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<Value>,
}

#[async_trait]
impl Tool for DuckDuckGoInstantAnswerTool {
    fn name(&self) -> &str {
        "duckduckgo_instant_answer"
    }

    fn description(&self) -> &str {
        "Requests an AI-generated abstract and relevant search results from the DuckDuckGo Instant Answer API. To be used when searching for or double-checking factual information when you determine that your internal world model may not be most reliable."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object().property("query", PropertySchema::string("Search query."), true).build(),
        }
    }

    fn timeout_secs(&self) -> u64 {
        15
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: SearchArgs = serde_json::from_value(input).map_err(|e| ToolError::invalid_params(e.to_string()))?;

        let response = self
            .http
            .get("https://api.duckduckgo.com/")
            .query(&[("q", args.query.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?
            .json::<InstantAnswerResponse>()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        let related: Vec<&Value> = response.related_topics.iter().filter(|t| t.get("Name").is_none()).collect();

        Ok(json!(format!(
            "Abstract Text: {}\n\nAbstract URL: {}\n\nRelated Topics: {}",
            response.abstract_text,
            response.abstract_url,
            serde_json::to_string(&related).unwrap_or_default()
        )))
    }
}

pub struct ScrapeWebpageTool {
    http: reqwest::Client,
}

impl ScrapeWebpageTool {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Default for ScrapeWebpageTool {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[derive(Debug, Deserialize)]
struct ScrapeArgs {
    url: String,
}

#[async_trait]
impl Tool for ScrapeWebpageTool {
    fn name(&self) -> &str {
        "scrape_webpage"
    }

    fn description(&self) -> &str {
        "Scrapes the requested URL and returns its visible text."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object().property("url", PropertySchema::string("URL to be scraped from."), true).build(),
        }
    }

    fn timeout_secs(&self) -> u64 {
        20
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let args: ScrapeArgs = serde_json::from_value(input).map_err(|e| ToolError::invalid_params(e.to_string()))?;

        let body = self
            .http
            .get(&args.url)
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?
            .text()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        let document = scraper::Html::parse_document(&body);
        let text: String = document.root_element().text().collect::<Vec<_>>().join(" ");

        Ok(json!(text.split_whitespace().collect::<Vec<_>>().join(" ")))
    }
}
