pub mod classify;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/classify",
            post(classify::handle_classify).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}
