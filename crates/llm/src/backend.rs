//! OpenAI-compatible chat-completions client with ordered backend/model
//! failover (spec §4.2).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use hearth_config::runtime::BackendConfig;
use hearth_core::traits::{ChatTurn, LanguageModel};
use hearth_core::Error;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Tries every model of every configured backend, in order, and returns
/// the first non-empty completion. Fails only once every backend/model
/// combination has been exhausted (`AllBackendsFailed`, spec §7's
/// `BackendFailure`).
pub struct FailoverLanguageModel {
    http: reqwest::Client,
    backends: Vec<BackendConfig>,
}

impl FailoverLanguageModel {
    pub fn new(backends: Vec<BackendConfig>) -> Self {
        Self { http: reqwest::Client::new(), backends }
    }

    async fn try_one(&self, backend: &BackendConfig, model: &str, messages: &[ChatTurn]) -> Result<String, String> {
        let url = format!("{}/chat/completions", backend.base_url.trim_end_matches('/'));
        let mut request = self.http.post(&url).json(&ChatCompletionRequest { model, messages });
        if let Some(key) = &backend.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("http {}", response.status()));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| e.to_string())?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| "empty completion from LLM".to_string())?;

        Ok(content)
    }
}

#[async_trait]
impl LanguageModel for FailoverLanguageModel {
    async fn complete(&self, messages: &[ChatTurn]) -> hearth_core::Result<String> {
        let mut errors = Vec::new();

        for backend in &self.backends {
            for model in &backend.models {
                match self.try_one(backend, model.trim(), messages).await {
                    Ok(content) => return Ok(content),
                    Err(e) => {
                        tracing::warn!(backend = %backend.name, model = %model, error = %e, "llm backend failed");
                        errors.push(format!("backend {} model {}: {e}", backend.name, model));
                    }
                }
            }
        }

        Err(Error::BackendFailure(format!("all llm backends failed:\n{}", errors.join("\n"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructs_with_empty_backend_list() {
        let client = FailoverLanguageModel::new(vec![]);
        assert!(client.backends.is_empty());
    }
}
