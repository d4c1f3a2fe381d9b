pub mod error;
pub mod experiences;
pub mod feed;
pub mod invalidation;
pub mod service;
pub mod state;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Experience routes, without transport layers (CORS, tracing).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/experiences",
            get(experiences::list_experiences).post(experiences::create_experience),
        )
        .route("/experiences/stats", get(experiences::get_stats))
        .route("/experiences/feed", get(experiences::get_feed))
        .route(
            "/experiences/{id}/helpful",
            post(experiences::increment_helpful),
        )
        .route("/experiences/{id}", delete(experiences::delete_experience))
        .with_state(state)
}
