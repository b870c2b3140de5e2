//! Pulls the YAML payload out of a raw model completion (spec §4.2's
//! assistant-turn extraction, grounded in the original `extract_yaml`).
//!
//! Models are asked to fence their answer in a ` ```yaml ` block but don't
//! always comply, and some leave a `<thought>...</thought>` preamble ahead
//! of a bare YAML body. This takes the first fenced block it finds;
//! failing that, it strips a leading `<thought>` tag and parses what's
//! left as YAML directly.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;

use hearth_core::Error;

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```(?:ya?ml)?\s*(.*?)```").expect("static regex"));

static THOUGHT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^<thought>.*?</thought>").expect("static regex"));

pub fn extract_yaml(response: &str) -> Result<Value, Error> {
    let yaml_str = if let Some(caps) = FENCE_RE.captures(response) {
        caps[1].trim().to_string()
    } else {
        THOUGHT_RE.replace(response, "").trim().to_string()
    };

    serde_yaml::from_str(&yaml_str).map_err(|e| Error::validation(format!("could not parse yaml: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_yaml_block() {
        let resp = "some preamble\n```yaml\nfoo: bar\n```\ntrailing text";
        let value = extract_yaml(resp).unwrap();
        assert_eq!(value["foo"].as_str(), Some("bar"));
    }

    #[test]
    fn takes_first_fenced_block_when_multiple_present() {
        let resp = "```yaml\nfoo: first\n```\nsome chatter\n```yaml\nfoo: second\n```";
        let value = extract_yaml(resp).unwrap();
        assert_eq!(value["foo"].as_str(), Some("first"));
    }

    #[test]
    fn strips_leading_thought_tag_when_unfenced() {
        let resp = "<thought>thinking it through</thought>\nfoo: bar";
        let value = extract_yaml(resp).unwrap();
        assert_eq!(value["foo"].as_str(), Some("bar"));
    }

    #[test]
    fn bare_yaml_with_no_thought_tag_parses_directly() {
        let resp = "foo: bar";
        let value = extract_yaml(resp).unwrap();
        assert_eq!(value["foo"].as_str(), Some("bar"));
    }
}
