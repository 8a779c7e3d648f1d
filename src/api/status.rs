//! Session and startup status for the page shell.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::state::{AppState, Notice};

#[derive(Serialize)]
pub struct StatusResponse {
    pub startup_notices: Vec<Notice>,
    pub processed_urls: Vec<String>,
    pub indexed_chunks: usize,
}

/// GET /api/status
pub async fn status(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, (StatusCode, String)> {
    let indexed_chunks = state
        .index
        .count()
        .await
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;

    Ok(Json(StatusResponse {
        startup_notices: state.startup_notices.as_ref().clone(),
        processed_urls: state.processed_urls.read().clone(),
        indexed_chunks,
    }))
}
