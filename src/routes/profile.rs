use axum::{extract::State, response::Html};
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    auth::gate::AuthUser,
    error::AppError,
    middleware::ClientIp,
    render::TemplateData,
    state::AppState,
};

#[instrument(skip(state, session))]
pub async fn profile(
    State(state): State<AppState>,
    session: Session,
    ClientIp(ip): ClientIp,
    AuthUser(user): AuthUser,
) -> Result<Html<String>, AppError> {
    let data = TemplateData {
        ip,
        user: Some(user),
        ..Default::default()
    };
    state.templates.render(&session, "profile.page.html", data).await
}
