use axum::body::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use inkwell_core::{PostId, UserId, Validate, ValidationErrors};
use inkwell_posts::Post;

// -------------------------
// Request parsing
// -------------------------

/// Decode a JSON body into its raw payload and run the payload schema.
///
/// Bodies that are not JSON, or carry fields of the wrong type, fail with a
/// single payload-level issue so they surface the same way as schema failures.
pub fn parse_body<P>(body: &Bytes) -> Result<P::Output, ValidationErrors>
where
    P: DeserializeOwned + Validate,
{
    let payload: P = serde_json::from_slice(body).map_err(|e| {
        ValidationErrors::single("", "invalid_type", format!("invalid JSON body: {e}"))
    })?;
    payload.validate()
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: UserId,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct PostIdResponse {
    pub id: PostId,
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub post: Option<Post>,
}
