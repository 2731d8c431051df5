use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::llm::{LlmClassifier, LlmSynthesizer};
use crate::pipeline::Pipeline;
use crate::store::MemoryStore;

/// Shared application state. Built once at process start; the store and the
/// HTTP client live for the process lifetime.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<Pipeline>,
    pub ask_semaphore: Arc<tokio::sync::Semaphore>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = Arc::new(MemoryStore::open(&config)?);

        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()?;

        let classifier = Arc::new(LlmClassifier::new(http_client.clone(), config.llm.clone()));
        let synthesizer = Arc::new(LlmSynthesizer::new(http_client, config.llm.clone()));

        let pipeline = Arc::new(Pipeline::new(
            classifier,
            store,
            synthesizer,
            config.max_context_records,
        ));
        let ask_semaphore = Arc::new(tokio::sync::Semaphore::new(config.max_concurrent_asks));

        Ok(Self {
            config,
            pipeline,
            ask_semaphore,
        })
    }
}
