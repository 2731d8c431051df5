use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::config::LlmConfig;
use crate::llm::Synthesizer;
use crate::models::{AnswerContext, ContextPayload, IntentKind};

/// Answer synthesis backed by the configured chat model. The pipeline
/// assembles the context; this only renders it into a prompt and relays
/// the model's prose.
pub struct LlmSynthesizer {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmSynthesizer {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Synthesizer for LlmSynthesizer {
    async fn synthesize(&self, context: &AnswerContext) -> Result<String> {
        let prompt = build_answer_prompt(context);

        let answer = match self.config.provider.as_str() {
            "ollama" => call_ollama(&self.client, &self.config, &prompt).await?,
            "openai" => call_openai(&self.client, &self.config, &prompt).await?,
            other => anyhow::bail!("Unknown LLM provider: {other}"),
        };

        Ok(answer.trim().to_string())
    }
}

fn build_answer_prompt(context: &AnswerContext) -> String {
    let mut prompt = String::from(
        "You are an assistant for a normative document base of circular notices, \
         operational instructions and a regulation.\n\
         Answer the user's question using ONLY the data below. Never invent documents, \
         numbers or dates. Reply in the language of the question, concisely.\n",
    );

    match context.intent_kind {
        IntentKind::CountItems => {
            prompt.push_str("The data is a total count; state it plainly.\n");
        }
        _ => {
            prompt.push_str(
                "List the matching documents with their identifier and a one-line \
                 description each. Include access links when present.\n",
            );
        }
    }

    if let ContextPayload::Records(records) = &context.payload {
        if context.results_count > records.len() {
            let _ = write!(
                prompt,
                "Only {} of {} matches are shown; say that more exist.\n",
                records.len(),
                context.results_count
            );
        }
    }

    if let Some(link) = context.regulation_link {
        let _ = write!(prompt, "The full regulation text is available at {link}.\n");
    }

    let _ = write!(
        prompt,
        "\n{}\n---\nQuestion: {}",
        build_context_block(context),
        context.query
    );
    prompt
}

fn build_context_block(context: &AnswerContext) -> String {
    match &context.payload {
        ContextPayload::Count(count) => format!("Total count: {count}"),
        ContextPayload::Records(records) => {
            let json = serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string());
            format!("Matching documents ({} total):\n{json}", context.results_count)
        }
    }
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Message,
}

async fn call_ollama(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
) -> Result<String> {
    let url = format!("{}/api/chat", config.base_url);

    let req = OllamaChatRequest {
        model: config.answer_model.clone(),
        messages: vec![Message {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        stream: false,
    };

    let resp = client
        .post(&url)
        .json(&req)
        .send()
        .await
        .context("Failed to call Ollama chat API for answer synthesis")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Ollama chat API returned {status}: {body}");
    }

    let body: OllamaChatResponse = resp.json().await?;
    Ok(body.message.content)
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: String,
}

async fn call_openai(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
) -> Result<String> {
    let url = format!("{}/v1/chat/completions", config.base_url);
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let req = OpenAiChatRequest {
        model: config.answer_model.clone(),
        messages: vec![OpenAiMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        temperature: 0.3,
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&req)
        .send()
        .await
        .context("Failed to call OpenAI chat API for answer synthesis")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("OpenAI chat API returned {status}: {body}");
    }

    let body: OpenAiChatResponse = resp.json().await?;
    Ok(body
        .choices
        .first()
        .map(|c| c.message.content.clone())
        .unwrap_or_default())
}
