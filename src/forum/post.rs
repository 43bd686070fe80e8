//! Post aggregate
//!
//! A post owns its vote ledger, comment log and view counter as one
//! consistency unit behind a single per-post lock. Identity fields
//! (id, title, author snapshot, content) are immutable after creation;
//! everything mutable lives in [`PostState`].
//!
//! Score accounting: a freshly created post starts at score 1 with
//! upvotePercentage 100 (author self-upvote semantics). After that the
//! ledger is the single source of truth - `score == sum(ledger values)`
//! plus the creation baseline, and the percentage is recomputed inside
//! the same lock acquisition as every vote mutation, so a reader can
//! never observe a score without its matching percentage.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::auth::Claims;
use crate::types::{AgoraError, Result};

/// Vote value accepted by the vote operation.
///
/// `Retract` (wire value 0) is a request-level sentinel: it removes the
/// caller's ledger entry and is never persisted itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteValue {
    Up,
    Down,
    Retract,
}

impl VoteValue {
    /// Parse a wire value; anything outside {-1, 0, 1} is rejected.
    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Up),
            -1 => Some(Self::Down),
            0 => Some(Self::Retract),
            _ => None,
        }
    }

    fn as_i64(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
            Self::Retract => 0,
        }
    }
}

/// A persisted ledger entry: at most one per subject, value strictly +-1.
#[derive(Debug, Clone, Serialize)]
pub struct Vote {
    #[serde(rename = "user")]
    pub user_id: String,
    #[serde(rename = "vote")]
    pub value: i64,
}

/// A comment in the post's ordered log
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: String,
    pub author: Claims,
    pub body: String,
    pub created: DateTime<Utc>,
}

/// Post content: text body or external link, never both.
#[derive(Debug, Clone)]
pub enum PostContent {
    Text(String),
    Link(String),
}

impl PostContent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Link(_) => "link",
        }
    }
}

/// Mutable state guarded by the per-post lock
#[derive(Debug)]
struct PostState {
    score: i64,
    upvote_percentage: i64,
    views: u64,
    votes: Vec<Vote>,
    comments: Vec<Comment>,
}

impl PostState {
    /// Derive the percentage from the ledger: 0 when empty, else
    /// floor(100 * upvotes / total).
    fn recompute_percentage(&mut self) {
        let upvotes = self.votes.iter().filter(|v| v.value == 1).count() as i64;
        let downvotes = self.votes.iter().filter(|v| v.value == -1).count() as i64;
        let total = upvotes + downvotes;

        self.upvote_percentage = if total == 0 { 0 } else { upvotes * 100 / total };
    }
}

/// Read-only snapshot of a post, shaped for the wire.
///
/// `text` is present iff `type == "text"`, `url` iff `type == "link"`.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub author: Claims,
    pub category: String,
    pub score: i64,
    pub votes: Vec<Vote>,
    pub comments: Vec<Comment>,
    pub created: DateTime<Utc>,
    pub views: u64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "upvotePercentage")]
    pub upvote_percentage: i64,
}

/// The post aggregate
pub struct Post {
    pub id: String,
    pub title: String,
    pub category: String,
    pub content: PostContent,
    /// Author identity snapshot - a copy, never a live user reference
    pub author: Claims,
    pub created: DateTime<Utc>,
    state: RwLock<PostState>,
}

impl Post {
    pub fn new(author: &Claims, title: String, category: String, content: PostContent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            category,
            content,
            author: author.clone(),
            created: Utc::now(),
            state: RwLock::new(PostState {
                score: 1,
                upvote_percentage: 100,
                views: 0,
                votes: Vec::new(),
                comments: Vec::new(),
            }),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, PostState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, PostState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn view_of(&self, state: &PostState) -> PostView {
        let (text, url) = match &self.content {
            PostContent::Text(text) => (Some(text.clone()), None),
            PostContent::Link(url) => (None, Some(url.clone())),
        };

        PostView {
            id: self.id.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            category: self.category.clone(),
            score: state.score,
            votes: state.votes.clone(),
            comments: state.comments.clone(),
            created: self.created,
            views: state.views,
            kind: self.content.kind(),
            text,
            url,
            upvote_percentage: state.upvote_percentage,
        }
    }

    /// Consistent read of the full post state
    pub fn snapshot(&self) -> PostView {
        let state = self.read_state();
        self.view_of(&state)
    }

    /// Apply a vote for one subject and recompute the percentage, all
    /// under a single write-lock acquisition.
    ///
    /// Idempotent per subject: resubmitting the same value changes
    /// nothing, retracting without a prior vote changes nothing, and
    /// switching direction applies the full delta (old removed, new added).
    pub fn vote(&self, subject_id: &str, value: VoteValue) -> PostView {
        let mut state = self.write_state();
        let existing = state.votes.iter().position(|v| v.user_id == subject_id);

        match (existing, value.as_i64()) {
            (None, 0) => {
                // nothing to retract
                return self.view_of(&state);
            }
            (None, new) => {
                state.score += new;
                state.votes.push(Vote {
                    user_id: subject_id.to_string(),
                    value: new,
                });
            }
            (Some(idx), 0) => {
                let old = state.votes.remove(idx).value;
                state.score -= old;
            }
            (Some(idx), new) => {
                let old = state.votes[idx].value;
                if old == new {
                    return self.view_of(&state);
                }
                state.score += new - old;
                state.votes[idx].value = new;
            }
        }

        state.recompute_percentage();
        self.view_of(&state)
    }

    /// Append a comment. Always succeeds; the author identity is
    /// snapshotted into the log entry.
    pub fn add_comment(&self, author: &Claims, body: String) -> PostView {
        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            author: author.clone(),
            body,
            created: Utc::now(),
        };

        let mut state = self.write_state();
        state.comments.push(comment);
        self.view_of(&state)
    }

    /// Remove a comment.
    ///
    /// Authorization is against the POST's author: only the post owner may
    /// delete comments here, regardless of who wrote them. The ownership
    /// check happens before the comment lookup, so a non-owner gets
    /// `Forbidden` even for a comment id that does not exist.
    pub fn delete_comment(&self, comment_id: &str, requester: &Claims) -> Result<PostView> {
        if self.author.id != requester.id {
            return Err(AgoraError::Forbidden(
                "only the post author may delete comments".into(),
            ));
        }

        let mut state = self.write_state();
        let idx = state
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| AgoraError::NotFound(format!("comment {}", comment_id)))?;

        state.comments.remove(idx);
        Ok(self.view_of(&state))
    }

    /// Count one view and return a snapshot reflecting it, from the same
    /// lock acquisition.
    pub fn record_view(&self) -> PostView {
        let mut state = self.write_state();
        state.views += 1;
        self.view_of(&state)
    }
}
