use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Canonical public link to the full regulation document. Included in the
/// answer context whenever regulation content is in scope, and backfilled
/// onto regulation records that lack a stored link.
pub const REGULATION_LINK: &str =
    "https://normativa.example.org/reglamento/texto-consolidado.pdf";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where the collection JSON files live
    pub data_dir: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// LLM provider configuration
    pub llm: LlmConfig,
    /// Maximum records serialized into the synthesis context
    pub max_context_records: usize,
    /// Maximum concurrent ask requests (each costs two LLM round-trips)
    pub max_concurrent_asks: usize,
    /// Timeout for a single LLM call, in seconds
    pub llm_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for intent classification
    pub classify_model: String,
    /// Model name for answer synthesis
    pub answer_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            bind_addr: "127.0.0.1:9000".to_string(),
            llm: LlmConfig::default(),
            max_context_records: 20,
            max_concurrent_asks: 3,
            llm_timeout_secs: 60,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            classify_model: "llama3.2".to_string(),
            answer_model: "llama3.2".to_string(),
            api_key: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("NORM_ASSIST_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("NORM_ASSIST_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_CLASSIFY_MODEL") {
            config.llm.classify_model = model;
        }
        if let Ok(model) = std::env::var("LLM_ANSWER_MODEL") {
            config.llm.answer_model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(val) = std::env::var("NORM_ASSIST_MAX_CONTEXT_RECORDS") {
            if let Ok(v) = val.parse() {
                config.max_context_records = v;
            }
        }
        if let Ok(val) = std::env::var("NORM_ASSIST_MAX_CONCURRENT_ASKS") {
            if let Ok(v) = val.parse() {
                config.max_concurrent_asks = v;
            }
        }
        if let Ok(val) = std::env::var("NORM_ASSIST_LLM_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.llm_timeout_secs = v;
            }
        }

        config
    }

    pub fn notices_path(&self) -> PathBuf {
        self.data_dir.join("notices.json")
    }

    pub fn instructions_path(&self) -> PathBuf {
        self.data_dir.join("instructions.json")
    }

    pub fn regulation_path(&self) -> PathBuf {
        self.data_dir.join("regulation.json")
    }
}
