use std::collections::HashMap;

use axum::{
    extract::{rejection::FormRejection, Form, State},
    response::Redirect,
};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    forms,
    session::{self, SessionUser},
    state::AppState,
    users::RepoError,
};

const INVALID_FORM: &str = "Invalid login credentials";
const INVALID_LOGIN: &str = "Invalid login!";

/// Every failure redirects home with the same 303, only the flashed error
/// differs.
#[instrument(skip(state, session, fields))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    fields: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Redirect, AppError> {
    let fields = match fields {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            warn!(error = %rejection, "login body is not a form");
            HashMap::new()
        }
    };

    let mut form = forms::Form::new(fields);
    form.required(&["email", "password"]);
    if !form.valid() {
        warn!("login with missing fields");
        session::put_error(&session, INVALID_FORM).await?;
        return Ok(Redirect::to("/"));
    }

    // stored emails keep their case, so only whitespace is dropped
    let email = form.get("email").trim().to_string();

    let user = match state.repo.get_user_by_email(&email).await {
        Ok(u) => u,
        Err(RepoError::NotFound) => {
            warn!(email = %email, "login unknown email");
            session::put_error(&session, INVALID_LOGIN).await?;
            return Ok(Redirect::to("/"));
        }
        Err(e) => return Err(e.into()),
    };

    if !user.password_matches(form.get("password"))? {
        warn!(email = %email, user_id = user.id, "login invalid password");
        session::put_error(&session, INVALID_LOGIN).await?;
        return Ok(Redirect::to("/"));
    }

    session::put_user(&session, &SessionUser::from(&user)).await?;
    session.cycle_id().await?;
    session::put_flash(&session, "Successfully logged in!").await?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Redirect::to("/user/profile"))
}

#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    session.flush().await?;
    info!("user logged out");
    Ok(Redirect::to("/"))
}
