//! Capability traits for the external services the pipeline consumes.
//!
//! - [`SimilaritySearch`]: a persistent FAQ vector index.
//! - [`TextGeneration`]: a large-language-model completion service.
//!
//! Both are narrow on purpose so tests can substitute doubles.

use std::future::Future;

use crate::{
  faq::{FaqEntry, FaqMatch},
  prompt::Prompt,
};

/// A similarity-search provider over FAQ entries.
///
/// The index persists independently of the service process; its contents are
/// only rebuilt at warm-up.
pub trait SimilaritySearch: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Number of entries currently indexed.
  fn count(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// The `k` entries most similar to `text`, best first.
  fn query<'a>(
    &'a self,
    text: &'a str,
    k: usize,
  ) -> impl Future<Output = Result<Vec<FaqMatch>, Self::Error>> + Send + 'a;

  /// Embed and insert `entries`. Existing entries with the same `faq_id` are
  /// replaced.
  fn bulk_insert<'a>(
    &'a self,
    entries: &'a [FaqEntry],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove every entry and the stored fingerprint.
  fn clear(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The fingerprint of the FAQ rows the index was last built from.
  fn fingerprint(
    &self,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  fn set_fingerprint<'a>(
    &'a self,
    fingerprint: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// A text-generation provider. The caller waits for the full answer.
pub trait TextGeneration: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn generate<'a>(
    &'a self,
    prompt: &'a Prompt,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
