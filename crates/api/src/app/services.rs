//! Account and post services composed over the datastore ports.

use std::sync::Arc;

use mockable::Clock;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument};

use inkwell_accounts::{NewUser, Signin, Signup};
use inkwell_auth::{Hs256Jwt, TokenIssuer, hash_password};
use inkwell_core::{DomainError, PostId, UserId};
use inkwell_infra::store::{
    InMemoryPostStore, InMemoryUserStore, PostStore, PostgresPostStore, PostgresUserStore,
    StoreError, UserStore,
};
use inkwell_posts::{NewPost, Post, PostDraft, PostUpdate};

use crate::middleware::AuthState;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Unexpected failure. `context` is shown to the client, `detail` is only logged.
    #[error("{context}: {detail}")]
    Internal {
        context: &'static str,
        detail: String,
    },
}

impl ServiceError {
    fn internal(context: &'static str, detail: impl ToString) -> Self {
        Self::Internal {
            context,
            detail: detail.to_string(),
        }
    }
}

/// Identity handed back by signup and signin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub token: String,
}

pub struct AppServices {
    users: Arc<dyn UserStore>,
    posts: Arc<dyn PostStore>,
    jwt: Arc<Hs256Jwt>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserStore>,
        posts: Arc<dyn PostStore>,
        jwt: Hs256Jwt,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            users,
            posts,
            jwt: Arc::new(jwt),
            clock,
        }
    }

    /// Process-local stores. Data is lost on restart.
    pub fn in_memory(jwt: Hs256Jwt, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let users = InMemoryUserStore::arc();
        let posts = Arc::new(InMemoryPostStore::new(users.clone()));
        Self::new(users, posts, jwt, clock)
    }

    /// Postgres stores sharing one pool.
    pub fn postgres(pool: PgPool, jwt: Hs256Jwt, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let users = Arc::new(PostgresUserStore::new(pool.clone()));
        let posts = Arc::new(PostgresPostStore::new(pool));
        Self::new(users, posts, jwt, clock)
    }

    /// State for the auth middleware; verifies with the same key and clock used to issue.
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            jwt: self.jwt.clone(),
            clock: self.clock.clone(),
        }
    }

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    pub async fn signup(&self, request: Signup) -> Result<Session, ServiceError> {
        const CONTEXT: &str = "Error creating user";

        let password =
            hash_password(&request.password).map_err(|e| ServiceError::internal(CONTEXT, e))?;
        let user = self
            .users
            .create(NewUser {
                name: request.name,
                email: request.email,
                password,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => DomainError::conflict("email already registered").into(),
                other => ServiceError::internal(CONTEXT, other),
            })?;

        info!(user_id = %user.id, "user registered");
        self.session_for(user.id, CONTEXT)
    }

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    pub async fn signin(&self, request: Signin) -> Result<Session, ServiceError> {
        const CONTEXT: &str = "Error signing in";

        let user = self
            .users
            .find_by_email(&request.email)
            .await
            .map_err(|e| ServiceError::internal(CONTEXT, e))?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        if !user.password.matches(&request.password) {
            return Err(DomainError::unauthorized("Invalid credentials").into());
        }

        self.session_for(user.id, CONTEXT)
    }

    #[instrument(skip(self, draft), fields(author_id = %author), err)]
    pub async fn create_post(&self, author: UserId, draft: PostDraft) -> Result<Post, ServiceError> {
        let post = self
            .posts
            .create(NewPost::authored_by(author, draft))
            .await
            .map_err(|e| match e {
                StoreError::MissingReference(_) => DomainError::unauthorized("unauthorized").into(),
                other => ServiceError::internal("Error creating post", other),
            })?;

        info!(post_id = %post.id, "post created");
        Ok(post)
    }

    #[instrument(skip(self, update), fields(author_id = %author, post_id = %update.id), err)]
    pub async fn update_post(
        &self,
        author: UserId,
        update: PostUpdate,
    ) -> Result<PostId, ServiceError> {
        self.posts
            .update_owned(update, author)
            .await
            .map_err(|e| ServiceError::internal("Error updating post", e))?
            .ok_or_else(|| DomainError::not_found("post not found").into())
    }

    #[instrument(skip(self), err)]
    pub async fn list_posts(&self) -> Result<Vec<Post>, ServiceError> {
        self.posts
            .list()
            .await
            .map_err(|e| ServiceError::internal("Error listing posts", e))
    }

    #[instrument(skip(self), fields(post_id = %id), err)]
    pub async fn get_post(&self, id: PostId) -> Result<Option<Post>, ServiceError> {
        self.posts
            .get(id)
            .await
            .map_err(|e| ServiceError::internal("Error fetching post", e))
    }

    fn session_for(&self, user_id: UserId, context: &'static str) -> Result<Session, ServiceError> {
        let token = self
            .jwt
            .issue(user_id, self.clock.utc())
            .map_err(|e| ServiceError::internal(context, e))?;
        Ok(Session { user_id, token })
    }
}
