//! Prompt assembly.
//!
//! [`build_prompt`] is a pure function: the same history, message, FAQ
//! matches and profession phrase always produce the same [`Prompt`].

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::{
  exchange::{ConversationTurn, Speaker},
  faq::FaqMatch,
};

/// Fixed instructions that open every system message.
pub const SYSTEM_INSTRUCTIONS: &str = "You are a helpful support assistant. \
Answer the user's latest message using the conversation so far. When the \
reference FAQ entries below are relevant, base your answer on them; otherwise \
answer from general knowledge and keep the reply concise.";

/// The role of a message sent to the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
  Assistant,
}

impl From<Speaker> for Role {
  fn from(speaker: Speaker) -> Self {
    match speaker {
      Speaker::User => Self::User,
      Speaker::Assistant => Self::Assistant,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
  pub role:    Role,
  pub content: String,
}

/// The ordered messages handed to a [`crate::provider::TextGeneration`]
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Prompt {
  pub messages: Vec<PromptMessage>,
}

impl Prompt {
  /// The last message, which is always the live user message for prompts
  /// produced by [`build_prompt`].
  pub fn latest(&self) -> Option<&PromptMessage> { self.messages.last() }
}

/// Render history, the live message, retrieved FAQs and the profession phrase
/// into a single prompt.
///
/// Layout: one `system` message (instructions, profession line if non-empty,
/// numbered FAQ block in ranking order if any), then every turn in order,
/// then the live message as the final `user` message.
pub fn build_prompt(
  history: &[ConversationTurn],
  message: &str,
  faqs: &[FaqMatch],
  profession: &str,
) -> Prompt {
  let mut messages = Vec::with_capacity(history.len() + 2);

  messages.push(PromptMessage {
    role:    Role::System,
    content: system_content(faqs, profession),
  });

  messages.extend(history.iter().map(|turn| PromptMessage {
    role:    turn.speaker.into(),
    content: turn.text.clone(),
  }));

  messages.push(PromptMessage { role: Role::User, content: message.to_owned() });

  Prompt { messages }
}

fn system_content(faqs: &[FaqMatch], profession: &str) -> String {
  let mut content = String::from(SYSTEM_INSTRUCTIONS);

  if !profession.is_empty() {
    let _ = write!(content, "\n\nThe user is a {profession}.");
  }

  if !faqs.is_empty() {
    content.push_str("\n\nReference FAQ entries, most relevant first:");
    for (rank, faq) in faqs.iter().enumerate() {
      let _ = write!(
        content,
        "\n{}. Q: {}\n   A: {}",
        rank + 1,
        faq.question,
        faq.answer
      );
    }
  }

  content
}
