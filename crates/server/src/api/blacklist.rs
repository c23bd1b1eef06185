//! Blacklist API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use mediamatch_core::{BlacklistEntry, BlacklistError, NewBlacklistEntry};

use super::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BlacklistQueryParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Serialize)]
pub struct BlacklistListResponse {
    pub entries: Vec<BlacklistEntry>,
    pub total: usize,
}

fn error_response(e: BlacklistError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        BlacklistError::NotFound(_) => StatusCode::NOT_FOUND,
        BlacklistError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/blacklist
///
/// List blacklisted entries, newest first.
pub async fn list_blacklist(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BlacklistQueryParams>,
) -> Result<Json<BlacklistListResponse>, impl IntoResponse> {
    match state.blacklist().list(params.limit) {
        Ok(entries) => {
            let total = entries.len();
            Ok(Json(BlacklistListResponse { entries, total }))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// POST /api/v1/blacklist
///
/// Blacklist a catalog entry so it is never resolved again.
pub async fn add_to_blacklist(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewBlacklistEntry>,
) -> Result<(StatusCode, Json<BlacklistEntry>), impl IntoResponse> {
    match state.blacklist().add(request) {
        Ok(entry) => {
            info!("Blacklisted catalog entry {}", entry.catalog_id);
            Ok((StatusCode::CREATED, Json(entry)))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// DELETE /api/v1/blacklist/{id}
///
/// Remove a catalog entry from the blacklist.
pub async fn remove_from_blacklist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<BlacklistEntry>, impl IntoResponse> {
    match state.blacklist().remove(id) {
        Ok(entry) => {
            info!("Removed catalog entry {} from blacklist", id);
            Ok(Json(entry))
        }
        Err(e) => Err(error_response(e)),
    }
}
