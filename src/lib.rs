//! Retrieval-augmented question answering over news articles.
//!
//! ```text
//! URLs ──► ingestion::fetch ──► ingestion::extract ──► SourceDocument
//!                                                          │
//!                               ingestion::chunk ◄─────────┘
//!                                       │
//!                                       ▼
//!            llm::embeddings ──► stores::ArticleIndex (SQLite + sqlite-vec)
//!                                       │
//!            question ──► retrieve ─────┤
//!                             │         ▼
//!                             └──► engine::answer_question ──► llm::chat
//! ```
//!
//! The `api` module and `main` wrap the pipelines in a single-page HTTP
//! shell; `stores::lifecycle` implements the deferred index deletion that
//! runs at process startup.

pub mod api;
pub mod config;
pub mod engine;
pub mod ingestion;
pub mod llm;
pub mod state;
pub mod stores;
pub mod types;
