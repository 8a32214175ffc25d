//! DeepSeek chat integration.
//!
//! DeepSeek exposes the OpenAI-compatible chat completions format at
//! `{base_url}/chat/completions`, so any compatible endpoint can be
//! configured in its place.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use super::prompts;
use super::Commentator;
use crate::types::{DealAnalysis, DealError, PropertyInfo};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Maximum retries on rate limit / server errors.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (ms).
const BASE_BACKOFF_MS: u64 = 1000;

// ---------------------------------------------------------------------------
// API types (OpenAI-compatible)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    total_tokens: u32,
}

fn first_content(body: ChatResponse) -> Option<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .map(|m| m.content)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct DeepSeekClient {
    http: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    total_calls: AtomicU64,
}

impl DeepSeekClient {
    pub fn new(
        api_key: SecretString,
        base_url: Option<String>,
        model: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build DeepSeek HTTP client")?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            total_calls: AtomicU64::new(0),
        })
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    fn commentary_error(&self, message: String) -> anyhow::Error {
        DealError::Commentary {
            model: self.model.clone(),
            message,
        }
        .into()
    }

    /// Send one system + user exchange, with retry + exponential backoff.
    async fn complete(&self, system: &str, user_message: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::system(system), ChatMessage::user(user_message)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };
        let url = format!("{}/chat/completions", self.base_url);

        let mut last_error = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = BASE_BACKOFF_MS * 2u64.pow(attempt - 1);
                debug!(attempt, delay_ms = delay, model = %self.model, "Retrying DeepSeek call");
                tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            }

            let resp = self
                .http
                .post(&url)
                .header(
                    "Authorization",
                    format!("Bearer {}", self.api_key.expose_secret()),
                )
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let body: ChatResponse = response
                            .json()
                            .await
                            .context("Failed to parse DeepSeek response")?;
                        let tokens = body.usage.as_ref().map(|u| u.total_tokens).unwrap_or(0);
                        let calls = self.total_calls.fetch_add(1, Ordering::Relaxed) + 1;

                        let text = first_content(body)
                            .ok_or_else(|| self.commentary_error("response had no choices".into()))?;

                        info!(model = %self.model, tokens, calls, "DeepSeek call complete");
                        return Ok(text);
                    }

                    let error_text = response.text().await.unwrap_or_default();
                    if status.as_u16() == 429 || status.is_server_error() {
                        warn!(
                            status = %status,
                            attempt,
                            model = %self.model,
                            error = %error_text,
                            "Retryable DeepSeek error"
                        );
                        last_error = Some(format!("HTTP {status}: {error_text}"));
                        continue;
                    }

                    return Err(self.commentary_error(format!("HTTP {status}: {error_text}")));
                }
                Err(e) => {
                    warn!(attempt, model = %self.model, error = %e, "DeepSeek request failed");
                    last_error = Some(format!("Request error: {e}"));
                }
            }
        }

        Err(self.commentary_error(format!(
            "failed after {MAX_RETRIES} retries: {}",
            last_error.unwrap_or_default()
        )))
    }

    /// Total number of successful API calls.
    pub fn total_calls(&self) -> u64 {
        self.total_calls.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Commentator implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl Commentator for DeepSeekClient {
    async fn extract_address(&self, message: &str) -> Result<Option<String>> {
        let reply = self
            .complete(prompts::address_extraction_system(), message)
            .await?;
        let address = prompts::parse_extracted_address(&reply);
        debug!(reply = %reply.trim(), found = address.is_some(), "Address extraction");
        Ok(address)
    }

    async fn commentary(
        &self,
        property: &PropertyInfo,
        analysis: &DealAnalysis,
        user_query: &str,
    ) -> Result<String> {
        let prompt = prompts::build_commentary_prompt(property, analysis, user_query);
        debug!(address = %property.address, model = %self.model, "Requesting commentary");
        self.complete(prompts::analyst_system(), &prompt).await
    }

    async fn chat(&self, message: &str) -> Result<String> {
        self.complete(prompts::chat_system(), message).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
