//! Datastore boundary for users and posts.
//!
//! Handlers depend on these traits only; the adapters decide whether rows live
//! in process memory (tests/dev) or in Postgres.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryPostStore, InMemoryUserStore};
pub use postgres::{PostgresPostStore, PostgresUserStore};

use async_trait::async_trait;
use thiserror::Error;

use inkwell_accounts::{NewUser, User};
use inkwell_core::{PostId, UserId};
use inkwell_posts::{NewPost, Post, PostUpdate};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced row does not exist (e.g. post author).
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// Any other datastore failure (connectivity, pool, decoding).
    #[error("datastore error: {0}")]
    Backend(String),
}

/// User rows keyed by id, unique by email.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Fails with `Conflict` when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// Post rows keyed by id.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a post. Fails with `MissingReference` when the author does not exist.
    async fn create(&self, post: NewPost) -> Result<Post, StoreError>;

    /// Update title/content of the post with `update.id` **only if** it is
    /// authored by `author`. Returns `None` when no row matched.
    async fn update_owned(
        &self,
        update: PostUpdate,
        author: UserId,
    ) -> Result<Option<PostId>, StoreError>;

    /// Every post, ordered by id.
    async fn list(&self) -> Result<Vec<Post>, StoreError>;

    async fn get(&self, id: PostId) -> Result<Option<Post>, StoreError>;
}
