use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::{
    error::AppError,
    session::{self, SessionUser},
};

/// Route layer for pages that need a logged-in user. Anonymous requests get
/// an error flash and a 307 back to the home page.
pub async fn require_user(session: Session, req: Request, next: Next) -> Response {
    match session::current_user(&session).await {
        Ok(Some(user)) => {
            debug!(user_id = user.id, path = %req.uri().path(), "authenticated request");
            next.run(req).await
        }
        Ok(None) => {
            debug!(path = %req.uri().path(), "anonymous request to protected route");
            if let Err(e) = session::put_error(&session, "Log in first!").await {
                warn!(error = %e, "could not store login error");
            }
            Redirect::temporary("/").into_response()
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

/// The session user of the current request.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match session::current_user(&session).await {
            Ok(Some(user)) => Ok(AuthUser(user)),
            Ok(None) => Err(Redirect::temporary("/").into_response()),
            Err(e) => Err(AppError::from(e).into_response()),
        }
    }
}
