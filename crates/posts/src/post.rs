use serde::{Deserialize, Serialize};

use inkwell_core::{PostId, UserId, Validate, ValidationErrors};

pub const TITLE_MAX_CHARS: usize = 200;

/// A blog post. `author_id` is fixed at creation and gates every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
}

/// Title and content as accepted from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

/// A post row about to be inserted (id assigned by the datastore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: UserId,
}

impl NewPost {
    pub fn authored_by(author_id: UserId, draft: PostDraft) -> Self {
        Self {
            title: draft.title,
            content: draft.content,
            author_id,
        }
    }
}

/// Replacement title/content for an existing post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostUpdate {
    pub id: PostId,
    pub title: String,
    pub content: String,
}

/// Raw create body as received.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePostPayload {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl Validate for CreatePostPayload {
    type Output = PostDraft;

    fn validate(self) -> Result<PostDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = errors.required_text("title", self.title, TITLE_MAX_CHARS);
        let content = errors.require("content", self.content);

        match (title, content) {
            (Some(title), Some(content)) if errors.is_empty() => Ok(PostDraft { title, content }),
            _ => Err(errors),
        }
    }
}

/// Raw update body as received.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostPayload {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl Validate for UpdatePostPayload {
    type Output = PostUpdate;

    fn validate(self) -> Result<PostUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let id = match errors.require("id", self.id) {
            Some(id) if id > 0 => Some(PostId::new(id)),
            Some(_) => {
                errors.push("id", "too_small", "id must be a positive integer");
                None
            }
            None => None,
        };
        let draft = CreatePostPayload {
            title: self.title,
            content: self.content,
        }
        .validate();

        match (id, draft) {
            (Some(id), Ok(draft)) if errors.is_empty() => Ok(PostUpdate {
                id,
                title: draft.title,
                content: draft.content,
            }),
            (_, Ok(_)) => Err(errors),
            (_, Err(draft_errors)) => {
                for issue in draft_errors.issues() {
                    errors.push(issue.path.clone(), issue.code, issue.message.clone());
                }
                Err(errors)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_serializes_with_camel_case_author() {
        let post = Post {
            id: PostId::new(5),
            title: "Hello".to_string(),
            content: "World".to_string(),
            author_id: UserId::new(2),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["id"], 5);
        assert_eq!(json["authorId"], 2);
        assert!(json.get("author_id").is_none());
    }

    #[test]
    fn create_payload_requires_title_and_content() {
        let errors = CreatePostPayload::default().validate().unwrap_err();
        let paths: Vec<_> = errors.issues().iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["title", "content"]);
    }

    #[test]
    fn empty_content_is_allowed_but_blank_title_is_not() {
        let draft = CreatePostPayload {
            title: Some(" Title ".to_string()),
            content: Some(String::new()),
        }
        .validate()
        .unwrap();
        assert_eq!(draft.title, "Title");
        assert_eq!(draft.content, "");

        let errors = CreatePostPayload {
            title: Some("  ".to_string()),
            content: Some("body".to_string()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.issues()[0].code, "too_small");
    }

    #[test]
    fn update_payload_collects_id_and_draft_issues() {
        let errors = UpdatePostPayload {
            id: Some(0),
            title: None,
            content: Some("x".to_string()),
        }
        .validate()
        .unwrap_err();
        let paths: Vec<_> = errors.issues().iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["id", "title"]);
    }

    #[test]
    fn valid_update_payload() {
        let payload: UpdatePostPayload =
            serde_json::from_str(r#"{"id":5,"title":"New","content":"Body"}"#).unwrap();
        let update = payload.validate().unwrap();
        assert_eq!(update.id, PostId::new(5));
        assert_eq!(update.title, "New");
    }

    #[test]
    fn new_post_takes_author_from_caller() {
        let draft = PostDraft {
            title: "t".to_string(),
            content: "c".to_string(),
        };
        let post = NewPost::authored_by(UserId::new(9), draft);
        assert_eq!(post.author_id, UserId::new(9));
    }
}
