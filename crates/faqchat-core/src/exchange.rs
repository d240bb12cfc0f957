//! Chat exchanges and the conversation turns derived from them.
//!
//! An exchange is one persisted question/answer pair. Exchanges are
//! append-only: the service never updates or deletes one. Conversation turns
//! are the transient, per-request view of the most recent exchanges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Input ───────────────────────────────────────────────────────────────────

/// A chat request: who is asking, and what. Any strings are accepted,
/// including empty ones; the message is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInput {
  pub user_id: String,
  pub message: String,
}

impl ChatInput {
  pub fn new(user_id: impl Into<String>, message: impl Into<String>) -> Self {
    Self { user_id: user_id.into(), message: message.into() }
  }
}

// ─── Persisted exchange ──────────────────────────────────────────────────────

/// One answered question, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatExchange {
  pub exchange_id: Uuid,
  pub user_id:     String,
  pub question:    String,
  pub answer:      String,
  /// Reserved for intent classification. Always written as `""` and never
  /// read by the pipeline.
  pub intent:      String,
  /// Server-assigned; never changes after creation.
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::ChatStore::record_exchange`].
/// `exchange_id` and `created_at` are always set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExchange {
  pub user_id:  String,
  pub question: String,
  pub answer:   String,
  pub intent:   String,
}

impl NewExchange {
  /// An exchange with the intent left as the empty placeholder.
  pub fn new(
    user_id: impl Into<String>,
    question: impl Into<String>,
    answer: impl Into<String>,
  ) -> Self {
    Self {
      user_id:  user_id.into(),
      question: question.into(),
      answer:   answer.into(),
      intent:   String::new(),
    }
  }
}

// ─── Conversation turns ──────────────────────────────────────────────────────

/// Who said a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
  User,
  Assistant,
}

impl Speaker {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::User => "user",
      Self::Assistant => "assistant",
    }
  }
}

/// A single utterance in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
  pub speaker: Speaker,
  pub text:    String,
}

impl ConversationTurn {
  pub fn user(text: impl Into<String>) -> Self {
    Self { speaker: Speaker::User, text: text.into() }
  }

  pub fn assistant(text: impl Into<String>) -> Self {
    Self { speaker: Speaker::Assistant, text: text.into() }
  }
}

/// Expand exchanges fetched newest-first into chronological turns.
///
/// The input order is reversed, then each exchange becomes a `user` turn
/// holding the question immediately followed by an `assistant` turn holding
/// the answer.
pub fn turns_from_recent(newest_first: Vec<ChatExchange>) -> Vec<ConversationTurn> {
  let mut turns = Vec::with_capacity(newest_first.len() * 2);
  for exchange in newest_first.into_iter().rev() {
    turns.push(ConversationTurn::user(exchange.question));
    turns.push(ConversationTurn::assistant(exchange.answer));
  }
  turns
}
