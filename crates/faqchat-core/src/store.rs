//! The `ChatStore` trait.
//!
//! Implemented by storage backends (e.g. `faqchat-store-sqlite`). The server
//! depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  exchange::{ChatExchange, NewExchange},
  faq::FaqEntry,
  preference::UserPreference,
};

/// Abstraction over the relational store holding chat exchanges, FAQ entries
/// and user preferences.
///
/// Exchanges are append-only. FAQ entries and preferences are read-only from
/// the service's point of view.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ChatStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Exchanges ─────────────────────────────────────────────────────────

  /// The newest `limit` exchanges for `user_id`, newest first. Ties on
  /// `created_at` are broken by insertion order. An unknown user yields an
  /// empty vector.
  fn recent_exchanges<'a>(
    &'a self,
    user_id: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ChatExchange>, Self::Error>> + Send + 'a;

  /// Durably append an exchange and return it as stored. The future resolves
  /// only after the write is committed.
  fn record_exchange(
    &self,
    input: NewExchange,
  ) -> impl Future<Output = Result<ChatExchange, Self::Error>> + Send + '_;

  // ── Preferences ───────────────────────────────────────────────────────

  /// The preference stored under `(user_id, key)`, if any.
  fn preference<'a>(
    &'a self,
    user_id: &'a str,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<UserPreference>, Self::Error>> + Send + 'a;

  // ── FAQ ───────────────────────────────────────────────────────────────

  /// Every FAQ entry, ordered by `faq_id`.
  fn list_faqs(
    &self,
  ) -> impl Future<Output = Result<Vec<FaqEntry>, Self::Error>> + Send + '_;
}
