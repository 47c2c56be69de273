//! Posts domain module.
//!
//! Blog post records and the create/update payload schemas (no IO, no HTTP,
//! no storage).

pub mod post;

pub use post::{CreatePostPayload, NewPost, Post, PostDraft, PostUpdate, UpdatePostPayload};
