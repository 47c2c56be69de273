//! Postgres-backed user and post stores.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Duplicate email, including two concurrent signups |
//! | Database (foreign key violation) | `23503` | `MissingReference` | Post author no longer exists |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | PoolTimedOut / PoolClosed | N/A | `Backend` | Pool exhausted or shut down |
//! | Other | N/A | `Backend` | Network errors, decoding failures, etc. |
//!
//! Every query borrows a connection from the shared pool for the duration of
//! the call only; the connection returns to the pool on every exit path.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use inkwell_accounts::{NewUser, User};
use inkwell_auth::PasswordDigest;
use inkwell_core::{PostId, UserId};
use inkwell_posts::{NewPost, Post, PostUpdate};

use super::{PostStore, StoreError, UserStore};

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            name: row.name,
            email: row.email,
            password: PasswordDigest::from_stored(row.password),
        }
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    author_id: i64,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: PostId::new(row.id),
            title: row.title,
            content: row.content,
            author_id: UserId::new(row.author_id),
        }
    }
}

/// Postgres user table adapter.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self, user), fields(email = %user.email), err)]
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.password.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_user", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        Ok(row.map(User::from))
    }
}

/// Postgres post table adapter.
#[derive(Debug, Clone)]
pub struct PostgresPostStore {
    pool: PgPool,
}

impl PostgresPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PostgresPostStore {
    #[instrument(skip(self, post), fields(author_id = %post.author_id), err)]
    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (title, content, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, author_id
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_post", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self, update), fields(post_id = %update.id, author_id = %author), err)]
    async fn update_owned(
        &self,
        update: PostUpdate,
        author: UserId,
    ) -> Result<Option<PostId>, StoreError> {
        // Ownership is part of the filter: a foreign post simply matches no row.
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE posts
            SET title = $1, content = $2
            WHERE id = $3 AND author_id = $4
            RETURNING id
            "#,
        )
        .bind(&update.title)
        .bind(&update.content)
        .bind(update.id.get())
        .bind(author.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_post", e))?;

        Ok(id.map(PostId::new))
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, content, author_id
            FROM posts
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_posts", e))?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self), fields(post_id = %id), err)]
    async fn get(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, content, author_id
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_post", e))?;

        Ok(row.map(Post::from))
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") => StoreError::MissingReference(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Backend(format!("timed out acquiring connection in {}", operation))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
