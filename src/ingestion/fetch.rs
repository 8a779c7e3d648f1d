//! Per-URL article fetching.
//!
//! Each URL is fetched independently; a failure is recorded in the report for
//! that URL alone and never aborts the remaining URLs.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use url::Url;

use super::extract::extract_article_text;
use crate::types::RagError;

/// Browser-like User-Agent; some news sites refuse the default client UA.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Extracted text of one article, tagged with its origin URL.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub text: String,
    pub source_url: String,
}

/// Per-URL outcome of a fetch pass.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum UrlStatus {
    /// Fetched and yielded non-empty text.
    Fetched,
    /// Fetched but no extractable content.
    Empty,
    /// Request or parse failure; the reason is user-visible.
    Failed(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UrlReport {
    pub url: String,
    #[serde(flatten)]
    pub status: UrlStatus,
}

/// Builds the HTTP client used for article fetching.
pub fn fetch_client() -> Result<Client, RagError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .use_rustls_tls()
        .build()
        .map_err(RagError::from)
}

/// Fetches every URL in order, returning the documents that yielded text and
/// a per-URL report.
///
/// Blank entries are dropped and duplicates collapse to their first
/// occurrence before any network traffic happens.
pub async fn fetch_articles(client: &Client, urls: &[String]) -> (Vec<SourceDocument>, Vec<UrlReport>) {
    let mut documents = Vec::new();
    let mut report = Vec::new();

    for url in dedup_urls(urls) {
        tracing::info!(%url, "fetching article");
        match fetch_one(client, &url).await {
            Ok(Some(text)) => {
                tracing::info!(%url, bytes = text.len(), "article processed");
                documents.push(SourceDocument {
                    text,
                    source_url: url.clone(),
                });
                report.push(UrlReport {
                    url,
                    status: UrlStatus::Fetched,
                });
            }
            Ok(None) => {
                tracing::warn!(%url, "no content extracted");
                report.push(UrlReport {
                    url,
                    status: UrlStatus::Empty,
                });
            }
            Err(err) => {
                tracing::error!(%url, error = %err, "fetch failed");
                report.push(UrlReport {
                    url,
                    status: UrlStatus::Failed(err.to_string()),
                });
            }
        }
    }

    (documents, report)
}

async fn fetch_one(client: &Client, url: &str) -> Result<Option<String>, RagError> {
    let url = Url::parse(url).map_err(|err| RagError::InvalidDocument(err.to_string()))?;
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;
    Ok(extract_article_text(&body))
}

fn dedup_urls(urls: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for url in urls {
        let trimmed = url.trim();
        if trimmed.is_empty() || seen.iter().any(|existing| existing == trimmed) {
            continue;
        }
        seen.push(trimmed.to_string());
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_duplicate_urls_are_filtered() {
        let urls = vec![
            "https://example.com/a".to_string(),
            "   ".to_string(),
            String::new(),
            "https://example.com/a".to_string(),
            "https://example.com/b".to_string(),
        ];
        assert_eq!(
            dedup_urls(&urls),
            vec![
                "https://example.com/a".to_string(),
                "https://example.com/b".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn invalid_url_is_reported_not_fatal() {
        let client = fetch_client().unwrap();
        let (documents, report) =
            fetch_articles(&client, &["not a url at all".to_string()]).await;
        assert!(documents.is_empty());
        assert_eq!(report.len(), 1);
        assert!(matches!(report[0].status, UrlStatus::Failed(_)));
    }
}
