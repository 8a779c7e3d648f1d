//! Shared application state.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::config::AppConfig;
use crate::ingestion::fetch_client;
use crate::llm::chat::{ChatModel, GroqChat};
use crate::llm::embeddings::{EmbeddingProvider, GeminiEmbeddings};
use crate::stores::lifecycle::StartupCleanup;
use crate::stores::{ArticleIndex, SqliteChunkStore};
use crate::types::RagError;

/// An operator-visible message produced during startup.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    /// Client used for article fetching (browser UA, 30 s timeout).
    pub fetch_client: reqwest::Client,
    pub index: Arc<ArticleIndex<SqliteChunkStore>>,
    pub chat: Arc<dyn ChatModel>,
    /// URLs successfully ingested during this process lifetime. Reset on
    /// clear; never persisted, and intentionally not reconciled with the
    /// on-disk index across restarts.
    pub processed_urls: Arc<RwLock<Vec<String>>>,
    pub startup_notices: Arc<Vec<Notice>>,
}

impl AppState {
    /// Builds the full application: store, providers, HTTP clients.
    ///
    /// Must run after [`crate::stores::resolve_pending_deletion`] — opening
    /// the store recreates the index directory.
    pub async fn new(config: AppConfig, cleanup: StartupCleanup) -> Result<Self, RagError> {
        let store = SqliteChunkStore::open(config.index_db_path(), config.embedding.dim).await?;

        let provider_client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .map_err(RagError::from)?;
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(GeminiEmbeddings::new(
            provider_client.clone(),
            config.embedding.clone(),
        ));
        let chat: Arc<dyn ChatModel> =
            Arc::new(GroqChat::new(provider_client, config.chat.clone()));

        Ok(Self {
            fetch_client: fetch_client()?,
            index: Arc::new(ArticleIndex::new(store, embedder)),
            chat,
            processed_urls: Arc::new(RwLock::new(Vec::new())),
            startup_notices: Arc::new(cleanup_notices(cleanup)),
            config,
        })
    }
}

fn cleanup_notices(cleanup: StartupCleanup) -> Vec<Notice> {
    match cleanup {
        StartupCleanup::NotNeeded => Vec::new(),
        StartupCleanup::Cleared => vec![Notice {
            level: NoticeLevel::Success,
            text: "Database cleared successfully on startup".to_string(),
        }],
        StartupCleanup::Locked { index_dir } => vec![Notice {
            level: NoticeLevel::Error,
            text: format!(
                "Database files are still locked. Please manually delete '{}' and restart.",
                index_dir.display()
            ),
        }],
    }
}
