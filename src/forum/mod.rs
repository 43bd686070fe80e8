//! The post/comment/vote aggregate and its store

pub mod post;
pub mod store;

pub use post::{Comment, Post, PostContent, PostView, Vote, VoteValue};
pub use store::{NewPost, PostStore};
