//! Forum endpoints
//!
//! Read surface (no auth): listings, category/author filters, single-post
//! fetch. Mutating surface (auth): create/delete post, comment, vote.
//! Handlers verify identity first, then hand verified [`Claims`] into the
//! store; they never reach into post internals themselves.

use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use super::{authenticate, error_response, json_response, parse_json_body, BoxBody};
use crate::forum::{NewPost, PostContent, VoteValue};
use crate::server::AppState;
use crate::types::AgoraError;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl CreatePostRequest {
    /// Validate the payload into post content: `text` posts carry a body,
    /// `link` posts carry a url, nothing else is accepted.
    fn into_new_post(self) -> Result<NewPost, AgoraError> {
        if self.title.is_empty() {
            return Err(AgoraError::Validation("title is required".into()));
        }
        if self.category.is_empty() {
            return Err(AgoraError::Validation("category is required".into()));
        }

        let content = match self.kind.as_str() {
            "text" => match self.text {
                Some(text) if !text.is_empty() => PostContent::Text(text),
                _ => return Err(AgoraError::Validation("text posts require text".into())),
            },
            "link" => match self.url {
                Some(url) if !url.is_empty() => PostContent::Link(url),
                _ => return Err(AgoraError::Validation("link posts require a url".into())),
            },
            other => {
                return Err(AgoraError::Validation(format!(
                    "unknown post type '{}'",
                    other
                )))
            }
        };

        Ok(NewPost {
            title: self.title,
            category: self.category,
            content,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub comment: String,
}

/// GET /api/posts
pub fn list(state: Arc<AppState>) -> Response<BoxBody> {
    json_response(StatusCode::OK, &state.posts.list())
}

/// GET /api/posts/{category}
pub fn list_by_category(state: Arc<AppState>, category: &str) -> Response<BoxBody> {
    json_response(StatusCode::OK, &state.posts.list_by_category(category))
}

/// GET /api/user/{username}
pub fn list_by_author(state: Arc<AppState>, username: &str) -> Response<BoxBody> {
    json_response(StatusCode::OK, &state.posts.list_by_author(username))
}

/// GET /api/post/{id} - counts one view
pub fn get(state: Arc<AppState>, id: &str) -> Response<BoxBody> {
    match state.posts.get(id) {
        Ok(view) => json_response(StatusCode::OK, &view),
        Err(e) => error_response(&e),
    }
}

/// POST /api/posts
pub async fn create(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let claims = match authenticate(&req, &state) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    let body: CreatePostRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    match body.into_new_post() {
        Ok(new) => json_response(StatusCode::CREATED, &state.posts.create(&claims, new)),
        Err(e) => error_response(&e),
    }
}

/// DELETE /api/post/{id}
pub fn delete(
    req: &Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<BoxBody> {
    let claims = match authenticate(req, &state) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match state.posts.delete(id, &claims) {
        Ok(()) => json_response(
            StatusCode::OK,
            &serde_json::json!({"message": "success"}),
        ),
        Err(e) => error_response(&e),
    }
}

/// GET /api/post/{id}/upvote | /downvote | /unvote
pub fn vote(
    req: &Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
    action: &str,
) -> Response<BoxBody> {
    let claims = match authenticate(req, &state) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    let value = match action {
        "upvote" => VoteValue::Up,
        "downvote" => VoteValue::Down,
        "unvote" => VoteValue::Retract,
        other => {
            return error_response(&AgoraError::Validation(format!(
                "unknown vote action '{}'",
                other
            )))
        }
    };

    match state.posts.vote(id, &claims, value) {
        Ok(view) => json_response(StatusCode::OK, &view),
        Err(e) => error_response(&e),
    }
}

/// POST /api/post/{id} - add a comment
pub async fn add_comment(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<BoxBody> {
    let claims = match authenticate(&req, &state) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    let body: CommentRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    if body.comment.is_empty() {
        return error_response(&AgoraError::Validation("comment body is required".into()));
    }

    match state.posts.add_comment(id, &claims, body.comment) {
        Ok(view) => json_response(StatusCode::CREATED, &view),
        Err(e) => error_response(&e),
    }
}

/// DELETE /api/post/{id}/{commentId}
pub fn delete_comment(
    req: &Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
    comment_id: &str,
) -> Response<BoxBody> {
    let claims = match authenticate(req, &state) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match state.posts.delete_comment(id, comment_id, &claims) {
        Ok(view) => json_response(StatusCode::OK, &view),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let req = CreatePostRequest {
            title: "t".into(),
            category: "c".into(),
            kind: "text".into(),
            text: Some("body".into()),
            url: None,
        };
        assert!(req.into_new_post().is_ok());

        let missing_text = CreatePostRequest {
            title: "t".into(),
            category: "c".into(),
            kind: "text".into(),
            text: None,
            url: Some("https://example.com".into()),
        };
        assert!(missing_text.into_new_post().is_err());

        let unknown_kind = CreatePostRequest {
            title: "t".into(),
            category: "c".into(),
            kind: "poll".into(),
            text: None,
            url: None,
        };
        assert!(unknown_kind.into_new_post().is_err());
    }

    #[test]
    fn test_link_request_validation() {
        let req = CreatePostRequest {
            title: "t".into(),
            category: "c".into(),
            kind: "link".into(),
            text: None,
            url: Some("https://example.com".into()),
        };
        let new = req.into_new_post().unwrap();
        assert_eq!(new.content.kind(), "link");
    }
}
