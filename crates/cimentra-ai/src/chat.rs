//! HTTP client for the hosted chat-completion endpoint.

use async_trait::async_trait;
use cimentra_core::{ExtractedFields, ReferencePeriod};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{parse, prompt, Extractor};

/// Low sampling temperature: extraction should be near-deterministic.
const TEMPERATURE: f32 = 0.1;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model endpoint returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("model returned no content")]
    Empty,
    #[error("model output is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// One request per pipeline run, no retry: a transient failure is terminal
/// for that invocation.
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatClient {
    /// `base_url` should be like `https://api.openai.com` (no trailing
    /// slash).
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    /// Send the two-turn extraction request and return the raw model text.
    async fn complete(&self, message: &str, period: ReferencePeriod) -> Result<String, ExtractError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt::system_prompt(&period),
                },
                ChatMessage {
                    role: "user",
                    content: prompt::user_message(message),
                },
            ],
            temperature: TEMPERATURE,
        };

        info!(model = %self.model, %period, "requesting field extraction");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ExtractError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = resp.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ExtractError::Empty)
    }
}

#[async_trait]
impl Extractor for ChatClient {
    async fn extract(
        &self,
        message: &str,
        period: ReferencePeriod,
    ) -> Result<ExtractedFields, ExtractError> {
        let raw = self.complete(message, period).await?;
        debug!(raw = %raw, "raw model output");
        let fields = parse::parse_fields(&raw)?;
        Ok(fields)
    }
}
