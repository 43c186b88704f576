use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::repo::{hash, RepoError, RepoResult, UserRepo};
use super::repo_types::{User, UserImage};

/// In-process stand-in for the Postgres repository with the same id,
/// uniqueness and foreign-key behaviour.
#[derive(Default)]
pub struct MemoryUserRepo {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    images: Vec<UserImage>,
    next_user_id: i32,
    next_image_id: i32,
}

impl Tables {
    fn with_profile_pic(&self, mut user: User) -> User {
        user.profile_pic = self
            .images
            .iter()
            .filter(|img| img.user_id == user.id)
            .max_by_key(|img| img.id)
            .cloned();
        user
    }
}

impl MemoryUserRepo {
    /// Seeded with `admin@example.com` / `secret` as user 1.
    pub fn seeded() -> Self {
        let repo = Self::default();
        {
            let mut tables = repo.inner.lock().unwrap();
            let mut admin = User::new("Admin", "User", "admin@example.com", "");
            admin.id = 1;
            admin.is_admin = 1;
            admin.password = hash("secret").unwrap();
            tables.users.push(admin);
            tables.next_user_id = 1;
        }
        repo
    }

    pub fn image_count(&self) -> usize {
        self.inner.lock().unwrap().images.len()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn all_users(&self) -> RepoResult<Vec<User>> {
        let tables = self.inner.lock().unwrap();
        let mut users = tables.users.clone();
        users.sort_by(|a, b| {
            (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name))
        });
        Ok(users)
    }

    async fn get_user(&self, id: i32) -> RepoResult<User> {
        let tables = self.inner.lock().unwrap();
        let user = tables
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(RepoError::NotFound)?;
        Ok(tables.with_profile_pic(user))
    }

    async fn get_user_by_email(&self, email: &str) -> RepoResult<User> {
        let tables = self.inner.lock().unwrap();
        let user = tables
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(RepoError::NotFound)?;
        Ok(tables.with_profile_pic(user))
    }

    async fn update_user(&self, user: &User) -> RepoResult<()> {
        let mut tables = self.inner.lock().unwrap();
        if tables
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(RepoError::Conflict(user.email.clone()));
        }
        let row = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepoError::NotFound)?;
        row.first_name = user.first_name.clone();
        row.last_name = user.last_name.clone();
        row.email = user.email.clone();
        row.is_admin = user.is_admin;
        row.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }

    async fn delete_user(&self, id: i32) -> RepoResult<()> {
        let mut tables = self.inner.lock().unwrap();
        if !tables.users.iter().any(|u| u.id == id) {
            return Err(RepoError::NotFound);
        }
        tables.images.retain(|img| img.user_id != id);
        tables.users.retain(|u| u.id != id);
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> RepoResult<i32> {
        let hashed = hash(&user.password)?;
        let mut tables = self.inner.lock().unwrap();
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::Conflict(user.email.clone()));
        }
        tables.next_user_id += 1;
        let mut row = user.clone();
        row.id = tables.next_user_id;
        row.password = hashed;
        row.profile_pic = None;
        tables.users.push(row);
        Ok(tables.next_user_id)
    }

    async fn reset_password(&self, id: i32, password: &str) -> RepoResult<()> {
        let hashed = hash(password)?;
        let mut tables = self.inner.lock().unwrap();
        let row = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepoError::NotFound)?;
        row.password = hashed;
        row.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }

    async fn insert_user_image(&self, image: &UserImage) -> RepoResult<i32> {
        let mut tables = self.inner.lock().unwrap();
        if !tables.users.iter().any(|u| u.id == image.user_id) {
            return Err(RepoError::ForeignKey(format!(
                "user_images.user_id {} has no matching user",
                image.user_id
            )));
        }
        tables.next_image_id += 1;
        let mut row = image.clone();
        row.id = tables.next_image_id;
        tables.images.push(row);
        Ok(tables.next_image_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_user_assigns_sequential_ids() {
        let repo = MemoryUserRepo::default();
        let first = repo
            .insert_user(&User::new("Admin", "User", "admin@example.com", "secret"))
            .await
            .unwrap();
        let second = repo
            .insert_user(&User::new("Other", "User", "other@example.com", "secret"))
            .await
            .unwrap();
        assert_eq!((first, second), (1, 2));
        assert_eq!(repo.all_users().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn insert_user_rejects_duplicate_email() {
        let repo = MemoryUserRepo::seeded();
        let err = repo
            .insert_user(&User::new("Dup", "User", "admin@example.com", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn insert_user_image_enforces_foreign_key() {
        let repo = MemoryUserRepo::seeded();

        let id = repo
            .insert_user_image(&UserImage::new(1, "test.jpg"))
            .await
            .unwrap();
        assert_eq!(id, 1);

        let err = repo
            .insert_user_image(&UserImage::new(100, "test.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::ForeignKey(_)));
        assert_eq!(repo.image_count(), 1);
    }

    #[tokio::test]
    async fn get_user_carries_latest_profile_pic() {
        let repo = MemoryUserRepo::seeded();
        repo.insert_user_image(&UserImage::new(1, "old.png")).await.unwrap();
        repo.insert_user_image(&UserImage::new(1, "new.png")).await.unwrap();

        let user = repo.get_user(1).await.unwrap();
        assert_eq!(user.profile_pic.unwrap().file_name, "new.png");
    }

    #[tokio::test]
    async fn update_then_lookup_by_new_email() {
        let repo = MemoryUserRepo::seeded();
        let mut user = repo.get_user_by_email("admin@example.com").await.unwrap();
        user.first_name = "Mat".into();
        user.email = "mat@example.com".into();
        repo.update_user(&user).await.unwrap();

        let user = repo.get_user(1).await.unwrap();
        assert_eq!(user.first_name, "Mat");
        assert!(matches!(
            repo.get_user_by_email("admin@example.com").await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_user_removes_images_too() {
        let repo = MemoryUserRepo::seeded();
        repo.insert_user_image(&UserImage::new(1, "a.png")).await.unwrap();

        repo.delete_user(1).await.unwrap();

        assert!(matches!(repo.get_user(1).await, Err(RepoError::NotFound)));
        assert_eq!(repo.image_count(), 0);
        assert!(matches!(repo.delete_user(1).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn reset_password_rehashes() {
        let repo = MemoryUserRepo::seeded();
        repo.reset_password(1, "password").await.unwrap();

        let user = repo.get_user(1).await.unwrap();
        assert!(user.password_matches("password").unwrap());
        assert!(!user.password_matches("secret").unwrap());
        assert!(matches!(
            repo.reset_password(42, "x").await,
            Err(RepoError::NotFound)
        ));
    }
}
