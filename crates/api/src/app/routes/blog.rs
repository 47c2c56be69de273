use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Path},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use inkwell_core::PostId;
use inkwell_posts::{CreatePostPayload, UpdatePostPayload};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthenticatedUser;

/// Routes that require an authenticated author.
pub fn protected_router() -> Router {
    Router::new().route("/", post(create_post).put(update_post))
}

/// Read-only routes open to anonymous callers.
pub fn public_router() -> Router {
    Router::new()
        .route("/bulk", get(list_posts))
        .route("/:id", get(get_post))
}

pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Bytes,
) -> axum::response::Response {
    let draft = match dto::parse_body::<CreatePostPayload>(&body) {
        Ok(v) => v,
        Err(e) => return errors::validation_error(e),
    };

    match services.create_post(user.user_id(), draft).await {
        Ok(post) => Json(dto::PostIdResponse { id: post.id }).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Bytes,
) -> axum::response::Response {
    let update = match dto::parse_body::<UpdatePostPayload>(&body) {
        Ok(v) => v,
        Err(e) => return errors::validation_error(e),
    };

    match services.update_post(user.user_id(), update).await {
        Ok(id) => Json(dto::PostIdResponse { id }).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_posts(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.list_posts().await {
        Ok(posts) => Json(dto::PostListResponse { posts }).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PostId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.get_post(id).await {
        Ok(post) => Json(dto::PostResponse { post }).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
