//! The per-request chat pipeline.
//!
//! History Loader → FAQ Retriever → Preference Lookup → Prompt Builder →
//! Generation Client → Interaction Logger. Each step is a free function over
//! the collaborator traits so it can be exercised on its own.

use std::time::Duration;

use faqchat_core::{
  exchange::{ChatExchange, ChatInput, ConversationTurn, NewExchange, turns_from_recent},
  outcome::{Generation, Retrieval},
  preference::{PROFESSION_KEY, profession_phrase},
  prompt::{Prompt, build_prompt},
  provider::{SimilaritySearch, TextGeneration},
  store::ChatStore,
};
use serde::Deserialize;
use tokio::time::timeout;

use crate::error::ApiError;

// ─── Settings ────────────────────────────────────────────────────────────────

/// Tunables for the pipeline, read from the `[chat]` config table.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSettings {
  /// How many past exchanges feed the prompt (each yields two turns).
  /// Deployments that want the older ten-row window set this to 10.
  #[serde(default = "default_history_exchanges")]
  pub history_exchanges:       usize,
  /// How many FAQ matches to request from the index.
  #[serde(default = "default_top_k")]
  pub top_k:                   usize,
  #[serde(default = "default_retrieval_timeout_secs")]
  pub retrieval_timeout_secs:  u64,
  #[serde(default = "default_generation_timeout_secs")]
  pub generation_timeout_secs: u64,
}

fn default_history_exchanges() -> usize { 5 }
fn default_top_k() -> usize { 3 }
fn default_retrieval_timeout_secs() -> u64 { 5 }
fn default_generation_timeout_secs() -> u64 { 60 }

impl Default for ChatSettings {
  fn default() -> Self {
    Self {
      history_exchanges:       default_history_exchanges(),
      top_k:                   default_top_k(),
      retrieval_timeout_secs:  default_retrieval_timeout_secs(),
      generation_timeout_secs: default_generation_timeout_secs(),
    }
  }
}

impl ChatSettings {
  pub fn retrieval_timeout(&self) -> Duration { Duration::from_secs(self.retrieval_timeout_secs) }

  pub fn generation_timeout(&self) -> Duration {
    Duration::from_secs(self.generation_timeout_secs)
  }
}

// ─── Steps ───────────────────────────────────────────────────────────────────

/// The user's last `exchanges` exchanges as chronological turns.
pub async fn load_history<S: ChatStore>(
  store: &S,
  user_id: &str,
  exchanges: usize,
) -> Result<Vec<ConversationTurn>, S::Error> {
  let recent = store.recent_exchanges(user_id, exchanges).await?;
  Ok(turns_from_recent(recent))
}

/// Best-effort FAQ lookup; never fails the request.
pub async fn retrieve_faqs<I: SimilaritySearch>(
  index: &I,
  message: &str,
  top_k: usize,
  limit: Duration,
) -> Retrieval {
  match timeout(limit, index.query(message, top_k)).await {
    Ok(Ok(matches)) => Retrieval::Found(matches),
    Ok(Err(e)) => {
      tracing::warn!(error = %e, "FAQ retrieval failed; continuing without FAQs");
      Retrieval::Degraded { reason: e.to_string() }
    }
    Err(_) => {
      tracing::warn!(?limit, "FAQ retrieval timed out; continuing without FAQs");
      Retrieval::Degraded { reason: format!("timed out after {limit:?}") }
    }
  }
}

/// The formatted profession phrase, or `""` when the user has none.
pub async fn lookup_profession<S: ChatStore>(
  store: &S,
  user_id: &str,
) -> Result<String, S::Error> {
  let pref = store.preference(user_id, PROFESSION_KEY).await?;
  Ok(profession_phrase(pref.as_ref()))
}

/// Call the generation service, substituting the fallback answer on failure.
pub async fn generate_answer<G: TextGeneration>(
  generator: &G,
  prompt: &Prompt,
  limit: Duration,
) -> Generation {
  match timeout(limit, generator.generate(prompt)).await {
    Ok(Ok(answer)) => Generation::Answer(answer),
    Ok(Err(e)) => {
      tracing::error!(error = %e, "generation failed; returning fallback answer");
      Generation::Fallback { reason: e.to_string() }
    }
    Err(_) => {
      tracing::error!(?limit, "generation timed out; returning fallback answer");
      Generation::Fallback { reason: format!("timed out after {limit:?}") }
    }
  }
}

/// Persist the exchange; resolves once the write is committed.
pub async fn log_exchange<S: ChatStore>(
  store: &S,
  user_id: &str,
  question: &str,
  answer: &str,
) -> Result<ChatExchange, S::Error> {
  store.record_exchange(NewExchange::new(user_id, question, answer)).await
}

// ─── Whole request ───────────────────────────────────────────────────────────

/// What the pipeline produced for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
  pub answer:             String,
  pub retrieval_degraded: bool,
  pub fallback:           bool,
}

/// Run every step for `input` and return the answer that was persisted.
pub async fn respond<S, I, G>(
  store: &S,
  index: &I,
  generator: &G,
  settings: &ChatSettings,
  input: &ChatInput,
) -> Result<Reply, ApiError>
where
  S: ChatStore,
  I: SimilaritySearch,
  G: TextGeneration,
{
  let user_id = input.user_id.as_str();

  let history = load_history(store, user_id, settings.history_exchanges)
    .await
    .map_err(ApiError::store)?;

  let retrieval = retrieve_faqs(
    index,
    &input.message,
    settings.top_k,
    settings.retrieval_timeout(),
  )
  .await;
  let retrieval_degraded = retrieval.is_degraded();
  let faqs = retrieval.into_matches();

  let profession = lookup_profession(store, user_id)
    .await
    .map_err(ApiError::store)?;

  let prompt = build_prompt(&history, &input.message, &faqs, &profession);

  let generation = generate_answer(generator, &prompt, settings.generation_timeout()).await;
  let fallback = generation.is_fallback();
  let answer = generation.into_text();

  log_exchange(store, user_id, &input.message, &answer)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(
    user_id,
    history_turns = history.len(),
    faqs = faqs.len(),
    retrieval_degraded,
    fallback,
    "answered chat message"
  );

  Ok(Reply { answer, retrieval_degraded, fallback })
}
