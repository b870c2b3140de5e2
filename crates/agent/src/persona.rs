//! One-shot persona drafting run at agent-creation time, grounded in
//! `original_source/persona_gen.py`'s `GeneratePersona` node.

use hearth_core::traits::{ChatTurn, LanguageModel};

use crate::error::AgentError;

#[derive(Debug, serde::Deserialize)]
struct GeneratePersonaResult {
    #[allow(dead_code)]
    analysis: String,
    persona: String,
}

/// Drafts an initial Agent Persona from a free-form description of the
/// agent's goals, retrying validation up to `max_retries` times the way
/// the original's `GeneratePersona` node did (`max_retries=10`).
///
/// Unlike [`crate::heartbeat::parse_call_agent_result`], the original's
/// persona extraction looks only for the literal ` ```yaml ` marker
/// (`resp.split("```yaml")[1].split("```")[0]`) rather than the more
/// forgiving regex `extract_yaml` uses elsewhere — kept distinct here for
/// the same reason the original kept the two extractions separate.
pub async fn generate_persona(
    llm: &dyn LanguageModel,
    goals: &str,
    persona_max_words: usize,
    max_retries: usize,
) -> Result<String, AgentError> {
    let prompt = hearth_config::prompts::persona_gen_prompt(goals, persona_max_words);
    let turns = vec![ChatTurn::new("user", prompt)];

    let mut last_error = String::new();
    for _ in 0..max_retries {
        let response = match llm.complete(&turns).await {
            Ok(response) => response,
            Err(e) => {
                last_error = e.to_string();
                continue;
            },
        };

        match parse_persona(&response, persona_max_words) {
            Ok(persona) => return Ok(persona),
            Err(e) => last_error = e,
        }
    }

    Err(AgentError::ResponseValidation { attempts: max_retries as u32, last_error })
}

fn parse_persona(response: &str, persona_max_words: usize) -> Result<String, String> {
    let yaml_str = response
        .split("```yaml")
        .nth(1)
        .and_then(|rest| rest.split("```").next())
        .ok_or_else(|| "no ```yaml fenced block found".to_string())?
        .trim();

    let result: GeneratePersonaResult =
        serde_yaml::from_str(yaml_str).map_err(|e| format!("invalid persona yaml: {e}"))?;

    let word_count = result.persona.split_whitespace().count();
    if word_count > persona_max_words {
        return Err(format!("persona is {word_count} words, exceeding the {persona_max_words} word cap"));
    }

    Ok(result.persona)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_persona() {
        let response = r#"```yaml
analysis: the user wants a tutor persona
persona: I am a patient and curious tutor who loves explaining ideas to the user.
```"#;
        let persona = parse_persona(response, 50).unwrap();
        assert!(persona.starts_with("I am a patient"));
    }

    #[test]
    fn rejects_a_persona_over_the_word_cap() {
        let long_persona = (0..20).map(|_| "word").collect::<Vec<_>>().join(" ");
        let response = format!("```yaml\nanalysis: too long\npersona: \"{long_persona}\"\n```");
        let err = parse_persona(&response, 5).unwrap_err();
        assert!(err.contains("exceeding"));
    }
}
