//! Persistent FAQ similarity index.
//!
//! [`SqliteVectorIndex`] stores one embedding per FAQ entry in its own SQLite
//! file and ranks entries by cosine similarity. Embeddings come from any
//! [`Embedder`]; [`HttpEmbedder`] talks to an OpenAI-compatible
//! `/embeddings` endpoint.

mod index;
mod schema;
mod vector;

pub mod embed;
pub mod error;

pub use embed::{Embedder, EmbedderConfig, HttpEmbedder};
pub use error::{Error, Result};
pub use index::SqliteVectorIndex;
