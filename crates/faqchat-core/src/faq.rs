//! FAQ entries and the ranked matches the similarity index returns for them.

use serde::{Deserialize, Serialize};

/// A stored question/answer pair used as retrieval context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
  /// Row identifier in the FAQ table; the index keys its vectors by it.
  pub faq_id:   i64,
  pub question: String,
  pub answer:   String,
}

/// One FAQ entry returned by a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqMatch {
  pub faq_id:   i64,
  pub question: String,
  pub answer:   String,
  /// Similarity reported by the index; higher is closer.
  pub score:    f32,
}
