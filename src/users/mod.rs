#[cfg(test)]
pub mod memory;
pub mod repo;
pub mod repo_types;

pub use repo::{PgUserRepo, RepoError, RepoResult, UserRepo};
pub use repo_types::{User, UserImage};
