use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{blacklist, handlers, keyword, resolve};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Resolution
        .route("/resolve", post(resolve::resolve))
        .route("/keyword", post(keyword::infer_keyword))
        // Blacklist
        .route("/blacklist", get(blacklist::list_blacklist))
        .route("/blacklist", post(blacklist::add_to_blacklist))
        .route("/blacklist/{id}", delete(blacklist::remove_from_blacklist))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
}
