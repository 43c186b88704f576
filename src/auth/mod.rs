use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub mod gate;
pub mod handlers;
pub mod password;

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(handlers::login))
}

/// Routes that expect [`gate::require_user`] in front of them.
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/user/logout", get(handlers::logout))
}
