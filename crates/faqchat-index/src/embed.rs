//! Text embedding providers.

use std::{future::Future, time::Duration};

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Turns text into fixed-length vectors.
pub trait Embedder: Send + Sync {
  /// One vector per input text, in input order.
  fn embed_batch<'a>(
    &'a self,
    texts: &'a [String],
  ) -> impl Future<Output = Result<Vec<Vec<f32>>>> + Send + 'a;

  /// Embed a single text.
  fn embed<'a>(&'a self, text: &'a str) -> impl Future<Output = Result<Vec<f32>>> + Send + 'a {
    async move {
      let batch = [text.to_owned()];
      self
        .embed_batch(&batch)
        .await?
        .pop()
        .ok_or_else(|| Error::Embedding("no vector returned".to_owned()))
    }
  }
}

// ─── HTTP implementation ─────────────────────────────────────────────────────

/// Connection settings for an OpenAI-compatible embeddings endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedderConfig {
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  #[serde(default)]
  pub api_key:      String,
  #[serde(default = "default_model")]
  pub model:        String,
  /// Maximum number of texts sent per request.
  #[serde(default = "default_batch_size")]
  pub batch_size:   usize,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_base_url() -> String {
  "https://dashscope.aliyuncs.com/compatible-mode/v1".to_owned()
}
fn default_model() -> String { "text-embedding-v3".to_owned() }
fn default_batch_size() -> usize { 10 }
fn default_timeout_secs() -> u64 { 30 }

impl Default for EmbedderConfig {
  fn default() -> Self {
    Self {
      base_url:     default_base_url(),
      api_key:      String::new(),
      model:        default_model(),
      batch_size:   default_batch_size(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
  model: &'a str,
  input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
  data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
  index:     usize,
  embedding: Vec<f32>,
}

/// Embedder backed by `POST {base_url}/embeddings`.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpEmbedder {
  client: Client,
  config: EmbedderConfig,
}

impl HttpEmbedder {
  pub fn new(config: EmbedderConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!("{}/embeddings", self.config.base_url.trim_end_matches('/'))
  }

  async fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let mut req = self.client.post(self.url()).json(&EmbeddingRequest {
      model: &self.config.model,
      input: texts,
    });
    if !self.config.api_key.is_empty() {
      req = req.bearer_auth(&self.config.api_key);
    }

    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::EmbeddingStatus { status, body });
    }

    let mut parsed: EmbeddingResponse = resp.json().await?;
    if parsed.data.len() != texts.len() {
      return Err(Error::Embedding(format!(
        "asked for {} vectors, got {}",
        texts.len(),
        parsed.data.len()
      )));
    }
    parsed.data.sort_by_key(|d| d.index);
    Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
  }
}

impl Embedder for HttpEmbedder {
  async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let mut vectors = Vec::with_capacity(texts.len());
    for chunk in texts.chunks(self.config.batch_size.max(1)) {
      vectors.extend(self.embed_chunk(chunk).await?);
    }
    tracing::debug!(count = vectors.len(), model = %self.config.model, "embedded texts");
    Ok(vectors)
  }
}
