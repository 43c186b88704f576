use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::auth::password::verify_password;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String, // argon2 PHC string once stored; plain text only on insert
    pub is_admin: i32,
    #[serde(skip_serializing)]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing)]
    pub updated_at: OffsetDateTime,
    #[sqlx(skip)]
    #[serde(skip_serializing)]
    pub profile_pic: Option<UserImage>,
}

impl User {
    /// A not-yet-persisted user; `password` is plain text and gets hashed by
    /// the repository on insert.
    pub fn new(first_name: &str, last_name: &str, email: &str, password: &str) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: 0,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: password.into(),
            is_admin: 0,
            created_at: now,
            updated_at: now,
            profile_pic: None,
        }
    }

    pub fn password_matches(&self, plain: &str) -> anyhow::Result<bool> {
        verify_password(plain, &self.password)
    }
}

/// Profile picture reference; `user_id` must point at an existing user.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserImage {
    pub id: i32,
    pub user_id: i32,
    pub file_name: String,
    #[serde(skip_serializing)]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing)]
    pub updated_at: OffsetDateTime,
}

impl UserImage {
    pub fn new(user_id: i32, file_name: &str) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: 0,
            user_id,
            file_name: file_name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
