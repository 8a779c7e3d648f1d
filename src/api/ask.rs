//! Question answering over the indexed articles.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::engine::{AnswerOutcome, answer_question};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// POST /api/ask — retrieve relevant chunks and generate an answer.
pub async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AnswerOutcome>, (StatusCode, String)> {
    let question = req.question.trim().to_string();
    if question.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Question is required".to_string()));
    }

    let indexed = state
        .index
        .count()
        .await
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;
    if indexed == 0 {
        return Err((
            StatusCode::CONFLICT,
            "No data in the database. Please process some URLs first.".to_string(),
        ));
    }

    let outcome = answer_question(
        &state.index,
        state.chat.as_ref(),
        &question,
        state.config.top_k,
    )
    .await
    .map_err(|err| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error generating response: {err}"),
        )
    })?;

    Ok(Json(outcome))
}
