//! Text embedding providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use crate::types::RagError;

/// Requests per `batchEmbedContents` call.
const EMBED_BATCH_SIZE: usize = 64;

/// Produces fixed-dimension vectors for texts.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider label used in logs.
    fn name(&self) -> &str;

    /// Embedding dimension; must match the vector index.
    fn ndims(&self) -> usize;

    /// Embeds a batch of texts, one vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    /// Embeds a single text.
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let mut embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| RagError::Embedding("provider returned no embedding".to_string()))
    }
}

/// Google Generative Language API embeddings (`text-embedding-004`).
pub struct GeminiEmbeddings {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl GeminiEmbeddings {
    pub fn new(client: reqwest::Client, config: EmbeddingConfig) -> Self {
        Self { client, config }
    }
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: String,
    content: EmbedContent<'a>,
}

#[derive(Serialize)]
struct EmbedContent<'a> {
    parts: Vec<EmbedPart<'a>>,
}

#[derive(Serialize)]
struct EmbedPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbedValues>,
}

#[derive(Deserialize)]
struct EmbedValues {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddings {
    fn name(&self) -> &str {
        "gemini"
    }

    fn ndims(&self) -> usize {
        self.config.dim
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/models/{}:batchEmbedContents",
            self.config.base_url, self.config.model
        );
        let model_path = format!("models/{}", self.config.model);

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            let request = BatchEmbedRequest {
                requests: batch
                    .iter()
                    .map(|text| EmbedRequest {
                        model: model_path.clone(),
                        content: EmbedContent {
                            parts: vec![EmbedPart { text: text.as_str() }],
                        },
                    })
                    .collect(),
            };

            let response = self
                .client
                .post(&url)
                .query(&[("key", self.config.api_key.as_str())])
                .json(&request)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(RagError::Embedding(format!(
                    "embedding API returned {status}: {body}"
                )));
            }

            let body: BatchEmbedResponse = response
                .json()
                .await
                .map_err(|err| RagError::Embedding(err.to_string()))?;

            if body.embeddings.len() != batch.len() {
                return Err(RagError::Embedding(format!(
                    "embedding API returned {} vectors for {} inputs",
                    body.embeddings.len(),
                    batch.len()
                )));
            }

            all_embeddings.extend(body.embeddings.into_iter().map(|e| e.values));
        }

        Ok(all_embeddings)
    }
}

/// Deterministic hash-based embeddings for tests and offline runs.
///
/// Identical texts map to identical vectors; different texts almost always
/// differ. No semantic meaning is implied.
pub struct MockEmbeddingProvider {
    dim: usize,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self { dim: 8 }
    }

    pub fn with_dim(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn ndims(&self) -> usize {
        self.dim
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts.iter().map(|text| hash_to_vec(text, self.dim)).collect())
    }
}

fn hash_to_vec(text: &str, dim: usize) -> Vec<f32> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let seed = hasher.finish();
    (0..dim)
        .map(|i| {
            let bits = seed.rotate_left((i * 8) as u32) ^ ((i as u64) << 24);
            (bits as f64 / u64::MAX as f64) as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_config(base_url: String) -> EmbeddingConfig {
        EmbeddingConfig {
            base_url,
            model: "text-embedding-004".to_string(),
            api_key: "test-key".to_string(),
            dim: 3,
        }
    }

    #[tokio::test]
    async fn mock_embeddings_are_deterministic() {
        let provider = MockEmbeddingProvider::new();
        let inputs = vec![
            "Hello world".to_string(),
            "Goodbye world".to_string(),
            "Hello world".to_string(),
        ];

        let first = provider.embed_batch(&inputs).await.unwrap();
        let second = provider.embed_batch(&inputs).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0], first[2], "identical text, identical embedding");
        assert_ne!(first[0], first[1], "different text, different embedding");
        assert!(first.iter().all(|v| v.len() == provider.ndims()));
    }

    #[tokio::test]
    async fn gemini_batch_request_and_response_roundtrip() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/models/text-embedding-004:batchEmbedContents")
                .query_param("key", "test-key");
            then.status(200).json_body(serde_json::json!({
                "embeddings": [
                    { "values": [0.1, 0.2, 0.3] },
                    { "values": [0.4, 0.5, 0.6] }
                ]
            }));
        });

        let provider = GeminiEmbeddings::new(reqwest::Client::new(), test_config(server.base_url()));
        let embeddings = provider
            .embed_batch(&["one".to_string(), "two".to_string()])
            .await
            .unwrap();

        mock.assert();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0], vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn gemini_non_success_status_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(403).body("forbidden");
        });

        let provider = GeminiEmbeddings::new(reqwest::Client::new(), test_config(server.base_url()));
        let err = provider
            .embed_batch(&["one".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
    }
}
