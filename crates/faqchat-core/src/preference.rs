//! User profile preferences.

use serde::{Deserialize, Serialize};

/// The preference key consulted on every chat request.
pub const PROFESSION_KEY: &str = "profession";

/// A single answered profile question for a user.
/// `(user_id, question)` is unique in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreference {
  pub user_id:  String,
  pub question: String,
  pub answer:   String,
}

/// Render the stored profession as the phrase used in the prompt.
///
/// Absent (or blank) → `""`; otherwise `"Freelance <answer>"`.
pub fn profession_phrase(preference: Option<&UserPreference>) -> String {
  match preference {
    Some(p) if !p.answer.is_empty() => format!("Freelance {}", p.answer),
    _ => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pref(answer: &str) -> UserPreference {
    UserPreference {
      user_id:  "u1".into(),
      question: PROFESSION_KEY.into(),
      answer:   answer.into(),
    }
  }

  #[test]
  fn missing_profession_is_empty() {
    assert_eq!(profession_phrase(None), "");
  }

  #[test]
  fn profession_gets_freelance_prefix() {
    assert_eq!(profession_phrase(Some(&pref("designer"))), "Freelance designer");
  }

  #[test]
  fn empty_answer_is_treated_as_missing() {
    assert_eq!(profession_phrase(Some(&pref(""))), "");
  }
}
