//! One-time FAQ index warm-up, run before the listener is bound.
//!
//! The default [`WarmupPolicy::IfEmpty`] only checks whether the index holds
//! any entries. That is a staleness proxy, not synchronisation: once the index
//! is non-empty, later edits to the FAQ table go unnoticed until a rebuild.
//! [`WarmupPolicy::Fingerprint`] closes that gap by comparing a digest of the
//! FAQ rows with the one stored on the index at the last build.

use faqchat_core::{faq::FaqEntry, provider::SimilaritySearch, store::ChatStore};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// When to rebuild the FAQ index at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupPolicy {
  /// Build only when the index reports zero entries.
  #[default]
  IfEmpty,
  /// Rebuild when the index is empty or built from different FAQ rows.
  Fingerprint,
  /// Clear and rebuild unconditionally.
  Always,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarmupOutcome {
  Skipped { indexed: usize },
  Rebuilt { entries: usize },
}

#[derive(Debug, Error)]
pub enum WarmupError {
  #[error("failed to read FAQ table: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("failed to update FAQ index: {0}")]
  Index(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl WarmupError {
  fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self { Self::Store(Box::new(e)) }

  fn index(e: impl std::error::Error + Send + Sync + 'static) -> Self { Self::Index(Box::new(e)) }
}

/// SHA-256 hex digest over the FAQ rows in the given order.
///
/// Each field is length-prefixed so adjacent fields cannot run together.
pub fn faq_fingerprint(faqs: &[FaqEntry]) -> String {
  let mut hasher = Sha256::new();
  for faq in faqs {
    hasher.update(faq.faq_id.to_le_bytes());
    for field in [&faq.question, &faq.answer] {
      hasher.update((field.len() as u64).to_le_bytes());
      hasher.update(field.as_bytes());
    }
  }
  hex::encode(hasher.finalize())
}

/// Bring the index in line with the FAQ table according to `policy`.
pub async fn warm_up<S, I>(
  store: &S,
  index: &I,
  policy: WarmupPolicy,
) -> Result<WarmupOutcome, WarmupError>
where
  S: ChatStore,
  I: SimilaritySearch,
{
  let indexed = index.count().await.map_err(WarmupError::index)?;

  match policy {
    WarmupPolicy::IfEmpty => {
      if indexed > 0 {
        tracing::info!(indexed, "FAQ index already populated; skipping rebuild");
        return Ok(WarmupOutcome::Skipped { indexed });
      }
      let faqs = store.list_faqs().await.map_err(WarmupError::store)?;
      rebuild(index, &faqs, false).await
    }

    WarmupPolicy::Fingerprint => {
      let faqs = store.list_faqs().await.map_err(WarmupError::store)?;
      let current = faq_fingerprint(&faqs);
      let stored = index.fingerprint().await.map_err(WarmupError::index)?;
      if indexed > 0 && stored.as_deref() == Some(current.as_str()) {
        tracing::info!(indexed, "FAQ index matches FAQ table; skipping rebuild");
        return Ok(WarmupOutcome::Skipped { indexed });
      }
      tracing::info!(indexed, "FAQ index is stale; rebuilding");
      rebuild(index, &faqs, indexed > 0).await
    }

    WarmupPolicy::Always => {
      let faqs = store.list_faqs().await.map_err(WarmupError::store)?;
      rebuild(index, &faqs, true).await
    }
  }
}

async fn rebuild<I: SimilaritySearch>(
  index: &I,
  faqs: &[FaqEntry],
  clear_first: bool,
) -> Result<WarmupOutcome, WarmupError> {
  if clear_first {
    index.clear().await.map_err(WarmupError::index)?;
  }
  index.bulk_insert(faqs).await.map_err(WarmupError::index)?;
  index
    .set_fingerprint(&faq_fingerprint(faqs))
    .await
    .map_err(WarmupError::index)?;

  tracing::info!(entries = faqs.len(), "built FAQ index");
  Ok(WarmupOutcome::Rebuilt { entries: faqs.len() })
}
