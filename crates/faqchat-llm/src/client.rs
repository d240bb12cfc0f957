//! HTTP client for `POST {base_url}/chat/completions`.

use std::time::Duration;

use faqchat_core::{
  prompt::{Prompt, Role},
  provider::TextGeneration,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings for the generation service.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
  /// Defaults to DashScope's OpenAI-compatible endpoint.
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  #[serde(default)]
  pub api_key:      String,
  #[serde(default = "default_model")]
  pub model:        String,
  pub temperature:  Option<f32>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_base_url() -> String {
  "https://dashscope.aliyuncs.com/compatible-mode/v1".to_owned()
}
fn default_model() -> String { "qwen-plus".to_owned() }
fn default_timeout_secs() -> u64 { 60 }

impl Default for LlmConfig {
  fn default() -> Self {
    Self {
      base_url:     default_base_url(),
      api_key:      String::new(),
      model:        default_model(),
      temperature:  None,
      timeout_secs: default_timeout_secs(),
    }
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct CompletionRequest<'a> {
  model:       &'a str,
  messages:    Vec<WireMessage<'a>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  temperature: Option<f32>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
  role:    Role,
  content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
  content: Option<String>,
}

impl CompletionResponse {
  fn into_answer(self) -> Result<String> {
    self
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .map(|text| text.trim().to_owned())
      .filter(|text| !text.is_empty())
      .ok_or(Error::EmptyCompletion)
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async client for an OpenAI-compatible chat-completions API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ChatCompletionsClient {
  client: Client,
  config: LlmConfig,
}

impl ChatCompletionsClient {
  pub fn new(config: LlmConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
  }

  fn request_body<'a>(&'a self, prompt: &'a Prompt) -> CompletionRequest<'a> {
    CompletionRequest {
      model:       &self.config.model,
      messages:    prompt
        .messages
        .iter()
        .map(|m| WireMessage { role: m.role, content: &m.content })
        .collect(),
      temperature: self.config.temperature,
    }
  }
}

impl TextGeneration for ChatCompletionsClient {
  type Error = Error;

  #[tracing::instrument(skip_all, fields(model = %self.config.model, messages = prompt.messages.len()))]
  async fn generate(&self, prompt: &Prompt) -> Result<String> {
    let mut req = self.client.post(self.url()).json(&self.request_body(prompt));
    if !self.config.api_key.is_empty() {
      req = req.bearer_auth(&self.config.api_key);
    }

    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status, body });
    }

    let parsed: CompletionResponse = resp.json().await?;
    let answer = parsed.into_answer()?;
    tracing::debug!(chars = answer.len(), "received completion");
    Ok(answer)
  }
}
