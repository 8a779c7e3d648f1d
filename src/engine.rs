//! The two pipelines: ingest (write path) and answer (read path).

use reqwest::Client;
use serde::Serialize;

use crate::ingestion::{UrlReport, fetch_articles, split_documents};
use crate::llm::chat::ChatModel;
use crate::stores::{ArticleIndex, VectorBackend};
use crate::types::RagError;

/// Characters of chunk text shown per source reference.
const SOURCE_EXCERPT_CHARS: usize = 300;

const SYSTEM_PROMPT: &str = "You are a news research assistant. Answer the question using only \
     the provided article excerpts. If the excerpts do not contain the answer, say so plainly.";

/// Result of one ingest pass over a set of URLs.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    /// URLs that yielded a document.
    pub documents: usize,
    /// Chunks embedded and persisted.
    pub chunks_stored: usize,
    /// Per-URL status, in input order.
    pub report: Vec<UrlReport>,
}

/// Fetches, extracts, chunks, embeds, and stores the given URLs.
///
/// Per-URL fetch failures are isolated into the report; an embedding or
/// storage failure aborts the pass and propagates.
pub async fn ingest_articles<B: VectorBackend>(
    client: &Client,
    index: &ArticleIndex<B>,
    urls: &[String],
) -> Result<IngestOutcome, RagError> {
    let (documents, report) = fetch_articles(client, urls).await;
    let chunks = split_documents(&documents);
    tracing::info!(
        documents = documents.len(),
        chunks = chunks.len(),
        "indexing fetched articles"
    );
    let chunks_stored = index.add(chunks).await?;
    Ok(IngestOutcome {
        documents: documents.len(),
        chunks_stored,
        report,
    })
}

/// A supporting chunk shown alongside an answer.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub source_url: String,
    pub excerpt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

/// Answers a question over the indexed articles.
///
/// Runs exactly one retrieval; its result feeds both the prompt context and
/// the returned sources, so the displayed sources always match what the
/// model saw.
pub async fn answer_question<B: VectorBackend>(
    index: &ArticleIndex<B>,
    chat: &dyn ChatModel,
    question: &str,
    top_k: usize,
) -> Result<AnswerOutcome, RagError> {
    let hits = index.retrieve(question, top_k).await?;
    tracing::info!(hits = hits.len(), model = chat.name(), "answering question");

    let context = hits
        .iter()
        .map(|(record, _)| record.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");
    let user_prompt = format!("Context:\n{context}\n\nQuestion: {question}");

    let answer = chat.complete(SYSTEM_PROMPT, &user_prompt).await?;

    let sources = hits
        .iter()
        .map(|(record, _)| SourceRef {
            source_url: record.url.clone(),
            excerpt: truncate_chars(&record.content, SOURCE_EXCERPT_CHARS),
        })
        .collect();

    Ok(AnswerOutcome { answer, sources })
}

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let truncated: String = text.chars().take(limit).collect();
    format!("{truncated}...")
}
