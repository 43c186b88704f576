use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::repo_types::{User, UserImage};
use crate::auth::password::hash_password;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("record not found")]
    NotFound,

    #[error("foreign key violation: {0}")]
    ForeignKey(String),

    #[error("unique constraint violation: {0}")]
    Conflict(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence for users and their profile images. Implementations must be
/// safe to share between concurrent requests.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn all_users(&self) -> RepoResult<Vec<User>>;
    async fn get_user(&self, id: i32) -> RepoResult<User>;
    async fn get_user_by_email(&self, email: &str) -> RepoResult<User>;
    async fn update_user(&self, user: &User) -> RepoResult<()>;
    async fn delete_user(&self, id: i32) -> RepoResult<()>;
    /// Hashes `user.password` and returns the new id.
    async fn insert_user(&self, user: &User) -> RepoResult<i32>;
    async fn reset_password(&self, id: i32, password: &str) -> RepoResult<()>;
    async fn insert_user_image(&self, image: &UserImage) -> RepoResult<i32>;
}

pub(crate) fn hash(plain: &str) -> RepoResult<String> {
    hash_password(plain).map_err(|e| RepoError::Hash(e.to_string()))
}

fn classify(e: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() {
            return RepoError::ForeignKey(db.message().to_string());
        }
        if db.is_unique_violation() {
            return RepoError::Conflict(db.message().to_string());
        }
    }
    RepoError::Database(e)
}

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password, is_admin, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn attach_profile_pic(&self, mut user: User) -> RepoResult<User> {
        user.profile_pic = sqlx::query_as::<_, UserImage>(
            r#"
            SELECT id, user_id, file_name, created_at, updated_at
            FROM user_images
            WHERE user_id = $1
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(user.id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn all_users(&self) -> RepoResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY last_name, first_name",
            USER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn get_user(&self, id: i32) -> RepoResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepoError::NotFound)?;
        self.attach_profile_pic(user).await
    }

    async fn get_user_by_email(&self, email: &str) -> RepoResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepoError::NotFound)?;
        self.attach_profile_pic(user).await
    }

    async fn update_user(&self, user: &User) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $1, last_name = $2, email = $3, is_admin = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.is_admin)
        .bind(OffsetDateTime::now_utc())
        .bind(user.id)
        .execute(&self.db)
        .await
        .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete_user(&self, id: i32) -> RepoResult<()> {
        let mut tx = self.db.begin().await?;

        let images = sqlx::query("DELETE FROM user_images WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let users = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if users.rows_affected() == 0 {
            // dropping the transaction rolls it back
            warn!(user_id = id, "delete of unknown user");
            return Err(RepoError::NotFound);
        }

        tx.commit().await?;
        debug!(user_id = id, images = images.rows_affected(), "user deleted");
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> RepoResult<i32> {
        let hashed = hash(&user.password)?;
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO users (first_name, last_name, email, password, is_admin, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(hashed)
        .bind(user.is_admin)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(classify)?;
        Ok(id)
    }

    async fn reset_password(&self, id: i32, password: &str) -> RepoResult<()> {
        let hashed = hash(password)?;
        let result = sqlx::query("UPDATE users SET password = $1, updated_at = $2 WHERE id = $3")
            .bind(hashed)
            .bind(OffsetDateTime::now_utc())
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn insert_user_image(&self, image: &UserImage) -> RepoResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO user_images (user_id, file_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(image.user_id)
        .bind(&image.file_name)
        .bind(image.created_at)
        .bind(image.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(classify)?;
        Ok(id)
    }
}
