//! OpenAI-compatible chat-completions client implementing
//! [`faqchat_core::provider::TextGeneration`].

mod client;

pub mod error;

pub use client::{ChatCompletionsClient, LlmConfig};
pub use error::{Error, Result};
