//! LLM collaborator boundary.
//!
//! The pipeline sees two opaque structured-completion services: one that
//! turns a query into an [`Intent`], one that turns an assembled
//! [`AnswerContext`] into prose. Both are trait objects so tests can swap
//! in stubs without a running provider.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{AnswerContext, Intent};

pub mod answer;
pub mod classify;

pub use answer::LlmSynthesizer;
pub use classify::LlmClassifier;

/// Classifies a raw query into a structured intent.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, query: &str) -> Result<Intent>;
}

/// Produces the natural-language answer from the assembled context.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, context: &AnswerContext) -> Result<String>;
}
