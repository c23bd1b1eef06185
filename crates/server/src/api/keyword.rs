//! Keyword inference API handler.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use mediamatch_core::KeywordGuess;

use super::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct KeywordRequest {
    pub phrase: String,
}

/// POST /api/v1/keyword
///
/// Infer the most likely title keyword for a noisy phrase.
pub async fn infer_keyword(
    State(state): State<Arc<AppState>>,
    Json(request): Json<KeywordRequest>,
) -> Result<Json<KeywordGuess>, (StatusCode, Json<ErrorResponse>)> {
    if request.phrase.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "phrase cannot be empty".to_string(),
            }),
        ));
    }

    Ok(Json(state.keywords().infer(&request.phrase).await))
}
