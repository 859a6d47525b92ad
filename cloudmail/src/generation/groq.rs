use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GenerationError, TextGenerator};

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.7;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: [ChatMessage<'a>; 1],
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
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

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl GroqConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        GroqConfig {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroqClient {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GroqClient {
    pub fn new(config: GroqConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Internal(e.to_string()))?;

        Ok(GroqClient {
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            model: config.model,
            api_key: config.api_key,
            client,
        })
    }
}

pub(crate) fn build_request<'a>(model: &'a str, prompt: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: [ChatMessage {
            role: "user",
            content: prompt,
        }],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}

/// Extract the first completion verbatim.
fn parse_response(body: &str) -> Result<String, GenerationError> {
    let resp: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::Internal(format!("decoding completion: {e}")))?;

    resp.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GenerationError::Internal("completion had no content".to_string()))
}

/// Pull the provider's own message out of an error payload, if it sent one.
fn provider_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| "API request failed".to_string())
}

fn classify(err: reqwest::Error) -> GenerationError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        GenerationError::Connectivity(err.to_string())
    } else {
        GenerationError::Internal(err.to_string())
    }
}

#[async_trait]
impl TextGenerator for GroqClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = build_request(&self.model, prompt);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        if !status.is_success() {
            tracing::debug!(%status, "provider rejected completion request");
            return Err(GenerationError::Provider(provider_message(&body)));
        }

        parse_response(&body)
    }
}
