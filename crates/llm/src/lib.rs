//! Backend-failover chat-completions client, YAML extraction and
//! tokenization for the hearth agent runtime (spec §4.2, §6).

pub mod backend;
pub mod tokenizer;
pub mod yaml;

pub use backend::FailoverLanguageModel;
pub use tokenizer::HfTokenizer;
pub use yaml::extract_yaml;
