//! Environment-driven configuration.
//!
//! Everything has a sensible default except the two provider API keys, which
//! must be present before the service starts. `.env` files are honored via
//! `dotenvy` in `main`, so local setups only need a two-line dotfile.

use std::path::PathBuf;

use crate::types::RagError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where the persistent index and its deletion marker live.
    pub data_dir: PathBuf,
    /// Server bind address.
    pub bind_addr: String,
    /// Embedding provider configuration.
    pub embedding: EmbeddingConfig,
    /// Chat completion provider configuration.
    pub chat: ChatConfig,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Base URL for the Generative Language API.
    pub base_url: String,
    /// Embedding model name.
    pub model: String,
    /// API key, from `GOOGLE_API_KEY`.
    pub api_key: String,
    /// Embedding vector dimension; must match the model.
    pub dim: usize,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL for the OpenAI-compatible chat API.
    pub base_url: String,
    /// Chat model name.
    pub model: String,
    /// API key, from `GROQ_API_KEY`.
    pub api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, RagError> {
        let embedding = EmbeddingConfig {
            base_url: env_or(
                "GOOGLE_API_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            model: env_or("NEWS_RESEARCHER_EMBEDDING_MODEL", "text-embedding-004"),
            api_key: require_env("GOOGLE_API_KEY")?,
            dim: env_parse_or("NEWS_RESEARCHER_EMBEDDING_DIM", 768),
        };

        let chat = ChatConfig {
            base_url: env_or("GROQ_API_BASE_URL", "https://api.groq.com/openai/v1"),
            model: env_or("NEWS_RESEARCHER_CHAT_MODEL", "llama-3.3-70b-versatile"),
            api_key: require_env("GROQ_API_KEY")?,
        };

        Ok(Self {
            data_dir: PathBuf::from(env_or("NEWS_RESEARCHER_DATA_DIR", "./data")),
            bind_addr: env_or("NEWS_RESEARCHER_BIND_ADDR", "127.0.0.1:8080"),
            embedding,
            chat,
            top_k: env_parse_or("NEWS_RESEARCHER_TOP_K", 5),
        })
    }

    /// Directory holding the persistent vector index.
    pub fn index_dir(&self) -> PathBuf {
        self.data_dir.join("index")
    }

    /// The SQLite file inside the index directory.
    pub fn index_db_path(&self) -> PathBuf {
        self.index_dir().join("chunks.sqlite")
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn require_env(key: &str) -> Result<String, RagError> {
    std::env::var(key)
        .map_err(|_| RagError::Config(format!("required environment variable {key} is not set")))
}
