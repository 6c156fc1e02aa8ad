use serde::{Deserialize, Serialize};
use reqwest::blocking::Client;
use anyhow::{anyhow, Context, Result};
use std::time::Duration;

use crate::config::settings::LlmSettings;

#[derive(Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    pub content: Option<String>,
}

/// A single-turn chat completion endpoint.
pub trait ChatService {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// OpenAI-compatible chat endpoint (OpenRouter by default).
pub struct OpenAiCompatClient {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: String,
}

impl OpenAiCompatClient {
    /// `None` when no API key is configured.
    pub fn from_settings(settings: &LlmSettings) -> Result<Option<Self>> {
        let Some(api_key) = settings.api_key.clone() else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Some(Self {
            client,
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            api_key,
        }))
    }
}

impl ChatService for OpenAiCompatClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let req = ChatCompletionRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "user".into(),
                    content: prompt.to_string(),
                }
            ],
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .context("chat request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(anyhow!("{} - {}", status, body.trim()));
        }

        let resp = resp
            .json::<ChatCompletionResponse>()
            .context("unexpected chat response")?;

        first_content(resp)
    }
}

fn first_content(resp: ChatCompletionResponse) -> Result<String> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| anyhow!("completion contained no text"))
}
