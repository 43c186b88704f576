//! Session keys and helpers on top of `tower-sessions`.
//!
//! The presence of [`USER_KEY`] in a session is what "logged in" means; the
//! [`FLASH_KEY`] and [`ERROR_KEY`] strings live until the next page render
//! pops them.

use serde::{Deserialize, Serialize};
use time::Duration;
use tower_sessions::{session, Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::SessionConfig;
use crate::users::User;

pub const USER_KEY: &str = "user";
pub const FLASH_KEY: &str = "flash";
pub const ERROR_KEY: &str = "error";

/// The part of a [`User`] kept in the session after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub profile_pic: Option<String>,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin != 0,
            profile_pic: user.profile_pic.as_ref().map(|img| img.file_name.clone()),
        }
    }
}

pub fn layer(config: &SessionConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.secure)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(config.idle_minutes)))
}

pub async fn current_user(session: &Session) -> Result<Option<SessionUser>, session::Error> {
    session.get::<SessionUser>(USER_KEY).await
}

pub async fn put_user(session: &Session, user: &SessionUser) -> Result<(), session::Error> {
    session.insert(USER_KEY, user).await
}

pub async fn put_flash(session: &Session, msg: &str) -> Result<(), session::Error> {
    session.insert(FLASH_KEY, msg).await
}

pub async fn put_error(session: &Session, msg: &str) -> Result<(), session::Error> {
    session.insert(ERROR_KEY, msg).await
}

/// Read a string and remove it so it is shown only once.
pub async fn pop_string(session: &Session, key: &str) -> Result<String, session::Error> {
    Ok(session.remove::<String>(key).await?.unwrap_or_default())
}
