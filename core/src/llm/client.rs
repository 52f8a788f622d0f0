use crate::llm::TextGenerator;
use crate::{QuotedeskError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error};

/// Configuration for LlmClient loaded from environment variables
#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    pub base_url: String, // e.g., https://api.x.ai/v1
    pub model: String,
    pub api_key: String,
    pub request_timeout_ms: u64,
    pub temperature: f32,
}

impl LlmClientConfig {
    /// Read configuration from the environment. The API key is the one
    /// required value; everything else carries a default. Temperature
    /// defaults to 0.0 so identical inputs produce stable decisions.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| QuotedeskError::Config("LLM_API_KEY is not set".to_string()))?;
        Ok(Self {
            base_url: std::env::var("LLM_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "https://api.x.ai/v1".to_string()),
            model: std::env::var("LLM_MODEL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "grok-beta".to_string()),
            api_key,
            request_timeout_ms: std::env::var("LLM_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30_000),
            temperature: std::env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse::<f32>().ok())
                .unwrap_or(0.0),
        })
    }
}

/// HTTP client for an OpenAI-compatible Chat Completions backend
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    cfg: LlmClientConfig,
}

impl LlmClient {
    pub fn new(cfg: LlmClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(|e| QuotedeskError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, cfg })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(LlmClientConfig::from_env()?)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    /// Send one rendered prompt through Chat Completions and return the
    /// assistant text. Errors carry upstream status/shape detail in the
    /// message; callers surface only the error code.
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.cfg.base_url.trim_end_matches('/'));
        debug!(target: "llm_client", model = %self.cfg.model, url = %url, "POST Chat Completions");

        let body = json!({
            "model": self.cfg.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.cfg.temperature,
        });

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.cfg.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| QuotedeskError::ModelBackend(format!("Chat Completions HTTP error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            error!(target: "llm_client", %status, body = %text, "Chat Completions error");
            return Err(QuotedeskError::ModelBackend(format!(
                "Chat Completions error: status={status}"
            )));
        }

        let val: serde_json::Value = resp.json().await.map_err(|e| {
            QuotedeskError::ModelBackend(format!("Failed to parse Chat Completions JSON: {e}"))
        })?;
        extract_text_from_chat_completions(&val).ok_or_else(|| {
            QuotedeskError::ModelBackend(
                "Missing choices[0].message.content in chat completions".into(),
            )
        })
    }
}

fn extract_text_from_chat_completions(v: &serde_json::Value) -> Option<String> {
    v.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(|s| s.to_string())
}
