//! Resolution API handler.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use mediamatch_core::{
    MediaQuery, MediaType, Resolution, ResolveError, ResolveOptions,
};

use super::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    /// Raw release or file name.
    pub title: String,
    /// Hints override whatever the name parser found.
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub episode: Option<u32>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

fn default_use_cache() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    /// The query as searched, with corrections applied.
    pub query: MediaQuery,
    #[serde(flatten)]
    pub resolution: Resolution,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/resolve
///
/// Resolve a release name to a catalog entry.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let Some(resolver) = state.resolver() else {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Catalog not configured",
        ));
    };

    if request.title.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "title cannot be empty"));
    }

    let mut query = MediaQuery::parse(&request.title, state.parser());
    if let Some(media_type) = request.media_type.filter(|t| *t != MediaType::Unknown) {
        query.media_type = media_type;
    }
    if let Some(year) = request.year {
        query.year = Some(year);
    }
    if let Some(season) = request.season {
        query.season = Some(season);
        query.media_type = MediaType::Series;
    }
    if let Some(episode) = request.episode {
        query.episode = Some(episode);
    }

    let options = ResolveOptions {
        strict: request.strict,
        use_cache: request.use_cache,
    };

    info!("Resolving '{}' as {:?}", request.title, query);
    match resolver.resolve(&mut query, options).await {
        Ok(resolution) => Ok(Json(ResolveResponse { query, resolution })),
        Err(ResolveError::Configuration(message)) => {
            error!("Catalog configuration error: {}", message);
            Err(api_error(StatusCode::SERVICE_UNAVAILABLE, message))
        }
        Err(e @ ResolveError::InvalidQuery(_)) => {
            Err(api_error(StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}
