//! Outcomes of the two best-effort pipeline steps.
//!
//! Neither FAQ retrieval nor answer generation may fail a request. Instead of
//! swallowing errors, both steps return one of these enums so the degradation
//! is visible to the caller and can be logged or inspected in tests.

use crate::faq::FaqMatch;

/// Text substituted when the generation service fails.
pub const FALLBACK_ANSWER: &str =
  "Sorry, something went wrong while generating a response.";

/// Result of querying the similarity index.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
  /// The index answered; the matches are in ranking order (possibly empty).
  Found(Vec<FaqMatch>),
  /// The index failed or timed out; the request continues without FAQs.
  Degraded { reason: String },
}

impl Retrieval {
  pub fn is_degraded(&self) -> bool { matches!(self, Self::Degraded { .. }) }

  /// The matches to feed into the prompt; empty when degraded.
  pub fn into_matches(self) -> Vec<FaqMatch> {
    match self {
      Self::Found(matches) => matches,
      Self::Degraded { .. } => Vec::new(),
    }
  }
}

/// Result of calling the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
  Answer(String),
  /// The service failed or timed out; [`FALLBACK_ANSWER`] stands in.
  Fallback { reason: String },
}

impl Generation {
  pub fn is_fallback(&self) -> bool { matches!(self, Self::Fallback { .. }) }

  /// The text returned to the caller and persisted.
  pub fn into_text(self) -> String {
    match self {
      Self::Answer(text) => text,
      Self::Fallback { .. } => FALLBACK_ANSWER.to_owned(),
    }
  }
}
