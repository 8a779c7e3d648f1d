//! Hosted model providers behind narrow traits.
//!
//! * [`embeddings`] — text embedding (Google Generative Language API, plus a
//!   deterministic mock for tests and offline runs).
//! * [`chat`] — chat completion (Groq's OpenAI-compatible API).

pub mod chat;
pub mod embeddings;

pub use chat::{ChatModel, GroqChat};
pub use embeddings::{EmbeddingProvider, GeminiEmbeddings, MockEmbeddingProvider};
