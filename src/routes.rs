use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/quiz/:id", get(handlers::get_quiz))
        .route("/api/score/submit", post(handlers::submit_score))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
