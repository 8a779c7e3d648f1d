//! Ingestion: turning article URLs into store-ready text chunks.
//!
//! * [`fetch`] — HTTP retrieval with per-URL failure isolation.
//! * [`extract`] — HTML cleanup and markdown-like text extraction.
//! * [`chunk`] — overlapping fixed-size windows over extracted text.

pub mod chunk;
pub mod extract;
pub mod fetch;

pub use chunk::{Chunk, split_document, split_documents, split_text};
pub use extract::extract_article_text;
pub use fetch::{SourceDocument, UrlReport, UrlStatus, fetch_articles, fetch_client};
