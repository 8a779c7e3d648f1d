//! End-to-end pipeline tests with a mock article server, mock embeddings,
//! and a temporary on-disk index.

use std::sync::Arc;

use async_trait::async_trait;
use httpmock::prelude::*;
use tempfile::tempdir;

use news_researcher::engine::{answer_question, ingest_articles};
use news_researcher::ingestion::{Chunk, UrlStatus, fetch_articles, fetch_client, split_document};
use news_researcher::llm::chat::ChatModel;
use news_researcher::llm::embeddings::MockEmbeddingProvider;
use news_researcher::stores::{
    ArticleIndex, SqliteChunkStore, StartupCleanup, mark_for_deletion, resolve_pending_deletion,
};
use news_researcher::types::RagError;

const ARTICLE_HTML: &str = r#"<html><head><title>t</title></head><body>
<article>
  <h1>Budget Vote</h1>
  <p>Parliament approved the budget on Thursday.</p>
  <p>The opposition abstained from the vote.</p>
</article>
</body></html>"#;

struct CannedChat {
    answer: String,
}

#[async_trait]
impl ChatModel for CannedChat {
    fn name(&self) -> &str {
        "canned"
    }

    async fn complete(&self, _system: &str, user_prompt: &str) -> Result<String, RagError> {
        assert!(
            user_prompt.contains("Question:"),
            "prompt must carry the question"
        );
        Ok(self.answer.clone())
    }
}

async fn open_index(dir: &std::path::Path) -> ArticleIndex<SqliteChunkStore> {
    let store = SqliteChunkStore::open(dir.join("index").join("chunks.sqlite"), 8)
        .await
        .unwrap();
    ArticleIndex::new(store, Arc::new(MockEmbeddingProvider::new()))
}

#[tokio::test]
async fn end_to_end_fetch_chunk_index_retrieve() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/news/a1");
        then.status(200).body(ARTICLE_HTML);
    });

    let client = fetch_client().unwrap();
    let article_url = server.url("/news/a1");
    let (documents, report) = fetch_articles(&client, &[article_url.clone()]).await;

    assert_eq!(documents.len(), 1);
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].status, UrlStatus::Fetched);
    assert_eq!(documents[0].source_url, article_url);

    let lines: Vec<&str> = documents[0]
        .text
        .lines()
        .filter(|line| !line.is_empty())
        .collect();
    assert!(lines[0].starts_with("# "));
    assert_eq!(lines.len(), 3, "heading plus two paragraphs");

    let chunks = split_document(&documents[0]);
    assert_eq!(chunks.len(), 1, "short article fits one chunk");
    assert_eq!(chunks[0].text, documents[0].text);

    let dir = tempdir().unwrap();
    let index = open_index(dir.path()).await;
    assert_eq!(index.add(chunks.clone()).await.unwrap(), 1);

    let hits = index.retrieve("any query", 1).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0.content, chunks[0].text);
    assert_eq!(hits[0].0.url, article_url);
}

#[tokio::test]
async fn per_url_failures_are_isolated() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/good");
        then.status(200).body(ARTICLE_HTML);
    });
    server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404).body("not found");
    });

    let client = fetch_client().unwrap();
    let (documents, report) = fetch_articles(
        &client,
        &[server.url("/missing"), server.url("/good")],
    )
    .await;

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].source_url, server.url("/good"));
    assert!(matches!(report[0].status, UrlStatus::Failed(_)));
    assert_eq!(report[1].status, UrlStatus::Fetched);
}

#[tokio::test]
async fn empty_pages_are_skipped_not_fatal() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/empty");
        then.status(200).body("<html><body></body></html>");
    });

    let client = fetch_client().unwrap();
    let (documents, report) = fetch_articles(&client, &[server.url("/empty")]).await;
    assert!(documents.is_empty());
    assert_eq!(report[0].status, UrlStatus::Empty);
}

#[tokio::test]
async fn retrieve_never_exceeds_k() {
    let dir = tempdir().unwrap();
    let index = open_index(dir.path()).await;

    let chunks: Vec<Chunk> = (0..7)
        .map(|i| Chunk {
            text: format!("chunk number {i} about topic {i}"),
            source_url: format!("https://example.com/{i}"),
        })
        .collect();
    index.add(chunks).await.unwrap();

    let hits = index.retrieve("topic", 2).await.unwrap();
    assert_eq!(hits.len(), 2);

    let hits = index.retrieve("topic", 100).await.unwrap();
    assert_eq!(hits.len(), 7, "no more entries than were added");
}

#[tokio::test]
async fn ingest_then_answer_reuses_one_retrieval() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/news/a1");
        then.status(200).body(ARTICLE_HTML);
    });

    let dir = tempdir().unwrap();
    let index = open_index(dir.path()).await;
    let client = fetch_client().unwrap();
    let article_url = server.url("/news/a1");

    let outcome = ingest_articles(&client, &index, &[article_url.clone()])
        .await
        .unwrap();
    assert_eq!(outcome.documents, 1);
    assert_eq!(outcome.chunks_stored, 1);

    let chat = CannedChat {
        answer: "The budget passed.".to_string(),
    };
    let answer = answer_question(&index, &chat, "What happened to the budget?", 5)
        .await
        .unwrap();

    assert_eq!(answer.answer, "The budget passed.");
    assert!(!answer.sources.is_empty());
    for source in &answer.sources {
        assert_eq!(source.source_url, article_url);
        assert!(source.excerpt.chars().count() <= 303);
    }
}

#[tokio::test]
async fn clear_marker_resolves_on_next_startup() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path();
    let index_dir = data_dir.join("index");

    {
        let index = open_index(data_dir).await;
        index
            .add(vec![Chunk {
                text: "some indexed text".to_string(),
                source_url: "https://example.com/a".to_string(),
            }])
            .await
            .unwrap();
        assert!(index_dir.exists());

        // The running process can only record the intent.
        mark_for_deletion(data_dir).await.unwrap();
        assert!(index_dir.exists(), "index survives until restart");
    }

    // Next startup, before any index is opened.
    let outcome = resolve_pending_deletion(data_dir, &index_dir).await.unwrap();
    assert_eq!(outcome, StartupCleanup::Cleared);
    assert!(!index_dir.exists());
    assert!(!data_dir.join("delete_index.marker").exists());

    // The store comes back empty afterwards.
    let index = open_index(data_dir).await;
    assert_eq!(index.count().await.unwrap(), 0);
}
