//! Article ingestion and database clearing.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::engine::{IngestOutcome, ingest_articles};
use crate::ingestion::UrlStatus;
use crate::state::AppState;
use crate::stores::mark_for_deletion;

#[derive(Deserialize)]
pub struct ProcessRequest {
    pub urls: Vec<String>,
}

#[derive(Serialize)]
pub struct ProcessResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: IngestOutcome,
}

/// POST /api/articles — fetch, chunk, embed, and index the given URLs.
pub async fn process_articles(
    State(state): State<AppState>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, (StatusCode, String)> {
    let urls: Vec<String> = req
        .urls
        .into_iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect();
    if urls.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Please enter at least one URL.".to_string(),
        ));
    }

    let outcome = ingest_articles(&state.fetch_client, &state.index, &urls)
        .await
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;

    if outcome.documents == 0 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "No content could be retrieved from the provided URLs.".to_string(),
        ));
    }

    {
        let mut processed = state.processed_urls.write();
        for report in &outcome.report {
            if report.status == UrlStatus::Fetched && !processed.contains(&report.url) {
                processed.push(report.url.clone());
            }
        }
    }

    Ok(Json(ProcessResponse {
        message: format!("Processed {} articles successfully!", outcome.documents),
        outcome,
    }))
}

#[derive(Serialize)]
pub struct ClearResponse {
    pub message: String,
}

/// POST /api/clear — mark the index for deletion on next startup and reset
/// the in-memory session.
pub async fn clear_database(
    State(state): State<AppState>,
) -> Result<Json<ClearResponse>, (StatusCode, String)> {
    mark_for_deletion(&state.config.data_dir)
        .await
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;

    state.processed_urls.write().clear();

    Ok(Json(ClearResponse {
        message: "Database marked for deletion. Restart the server to complete clearing."
            .to_string(),
    }))
}
