//! Wraps a Hugging Face tokenizer so the heartbeat loop and recursive
//! summarizer can budget against the model's real token count rather than
//! an approximation (spec §4.2, §4.3).

use hearth_core::traits::Tokenizer;

pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
}

impl HfTokenizer {
    pub fn from_file(path: &str) -> Result<Self, hearth_core::Error> {
        let inner = tokenizers::Tokenizer::from_file(path)
            .map_err(|e| hearth_core::Error::BackendFailure(format!("failed to load tokenizer: {e}")))?;
        Ok(Self { inner })
    }
}

impl Tokenizer for HfTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        self.inner.encode(text, false).map(|enc| enc.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tokenizer_file_errors() {
        let result = HfTokenizer::from_file("/nonexistent/tokenizer.json");
        assert!(result.is_err());
    }
}
