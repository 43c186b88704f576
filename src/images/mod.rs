use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::post, Router};

pub mod handlers;
pub mod services;

/// Upload routes; expects the auth gate in front.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload", post(handlers::upload_profile_pic))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
