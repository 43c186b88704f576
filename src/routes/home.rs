use axum::{extract::State, response::Html};
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    error::AppError,
    middleware::ClientIp,
    render::TemplateData,
    state::AppState,
};

#[instrument(skip(state, session))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    ClientIp(ip): ClientIp,
) -> Result<Html<String>, AppError> {
    let data = TemplateData {
        ip,
        ..Default::default()
    };
    state.templates.render(&session, "home.page.html", data).await
}
