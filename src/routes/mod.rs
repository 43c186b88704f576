use crate::state::AppState;
use axum::{routing::get, Router};

pub mod home;
pub mod profile;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home::home))
}

/// Pages that expect the auth gate in front.
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/user/profile", get(profile::profile))
}
