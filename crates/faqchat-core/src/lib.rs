//! Core types and trait definitions for the faqchat service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend, the similarity index and the text-generation client all
//! live behind the traits in [`store`] and [`provider`]; the pure parts of the
//! request pipeline (history expansion, preference formatting, prompt
//! assembly) live here so they can be tested without any I/O.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod exchange;
pub mod faq;
pub mod outcome;
pub mod preference;
pub mod prompt;
pub mod provider;
pub mod store;
