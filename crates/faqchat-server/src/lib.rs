//! HTTP layer for faqchat.
//!
//! Exposes an axum [`Router`] serving `POST /chat` backed by any
//! [`ChatStore`], [`SimilaritySearch`] and [`TextGeneration`] implementation,
//! plus the startup [`warmup`] routine for the FAQ index.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/chat` | Body: `{"user_id":"...","message":"..."}`; returns `{"answer":"..."}` |
//! | `GET`  | `/health` | Liveness probe |

pub mod chat;
pub mod error;
pub mod pipeline;
pub mod warmup;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  routing::{get, post},
};
use faqchat_core::{
  provider::{SimilaritySearch, TextGeneration},
  store::ChatStore,
};
use faqchat_index::EmbedderConfig;
use faqchat_llm::LlmConfig;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use pipeline::ChatSettings;
use warmup::WarmupPolicy;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `FAQCHAT_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  /// SQLite file holding exchanges, FAQ entries and preferences.
  #[serde(default = "default_store_path")]
  pub store_path:    PathBuf,
  /// SQLite file holding the FAQ vector index.
  #[serde(default = "default_index_path")]
  pub index_path:    PathBuf,
  #[serde(default)]
  pub warmup_policy: WarmupPolicy,
  #[serde(default)]
  pub chat:          ChatSettings,
  #[serde(default)]
  pub llm:           LlmConfig,
  #[serde(default)]
  pub embedding:     EmbedderConfig,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("faqchat.db") }
fn default_index_path() -> PathBuf { PathBuf::from("faqchat-index.db") }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, I, G> {
  pub store:     Arc<S>,
  pub index:     Arc<I>,
  pub generator: Arc<G>,
  pub settings:  Arc<ChatSettings>,
}

impl<S, I, G> AppState<S, I, G> {
  pub fn new(store: S, index: I, generator: G, settings: ChatSettings) -> Self {
    Self {
      store:     Arc::new(store),
      index:     Arc::new(index),
      generator: Arc::new(generator),
      settings:  Arc::new(settings),
    }
  }
}

// Manual impl: cloning only bumps the `Arc`s, so the backends need not be
// `Clone` themselves.
impl<S, I, G> Clone for AppState<S, I, G> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      index:     Arc::clone(&self.index),
      generator: Arc::clone(&self.generator),
      settings:  Arc::clone(&self.settings),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the chat service.
pub fn router<S, I, G>(state: AppState<S, I, G>) -> Router
where
  S: ChatStore + 'static,
  I: SimilaritySearch + 'static,
  G: TextGeneration + 'static,
{
  Router::new()
    .route("/chat", post(chat::handler::<S, I, G>))
    .route("/health", get(health))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

#[cfg(test)]
mod testing;

#[cfg(test)]
mod tests;
