use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::llm::Classifier;
use crate::models::Intent;

/// Intent classification backed by the configured chat model.
pub struct LlmClassifier {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmClassifier {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, query: &str) -> Result<Intent> {
        let prompt = build_classify_prompt(query);

        let response = match self.config.provider.as_str() {
            "ollama" => call_ollama(&self.client, &self.config, &prompt).await?,
            "openai" => call_openai(&self.client, &self.config, &prompt).await?,
            other => anyhow::bail!("Unknown LLM provider: {other}"),
        };

        parse_intent(&response)
    }
}

fn build_classify_prompt(query: &str) -> String {
    format!(
        "You classify user questions about a normative document base holding circular \
         notices (identified by NN/YY numbers), coded operational instructions (titles \
         like \"I141 - ...\" or \"E3 - ...\") and a regulation divided into articles. \
         Questions may be in Spanish or English.\n\n\
         Question: \"{query}\"\n\n\
         Respond with ONLY a JSON object, no explanation, with these keys:\n\
         - \"intent\": one of \"search_info\", \"count_items\", \"search_latest\", \"unknown\"\n\
         - \"documentType\": one of \"notice\", \"instruction\", \"regulation\", \"all\"\n\
         - \"keywords\": array of the meaningful search terms from the question\n\
         - \"year\": a 4-digit year if the question mentions one, else null\n\
         - \"subType\": for latest-instruction questions, \"internal\", \"external\" or \"both\", else null\n\n\
         Keep identifiers like \"06/20\" or \"I141\" as keywords verbatim. Use \"unknown\" \
         for greetings and questions unrelated to the document base."
    )
}

/// Extract the first JSON object from the model reply and decode it.
fn parse_intent(content: &str) -> Result<Intent> {
    let json_str = match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => content,
    };

    serde_json::from_str::<Intent>(json_str)
        .with_context(|| format!("Failed to parse intent from: {content}"))
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
        model: config.classify_model.clone(),
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
        .context("Failed to call Ollama chat API for intent classification")?;

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
        model: config.classify_model.clone(),
        messages: vec![OpenAiMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        temperature: 0.0,
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&req)
        .send()
        .await
        .context("Failed to call OpenAI chat API for intent classification")?;

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
