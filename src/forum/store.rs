//! In-memory post store
//!
//! Owns post membership (create/delete/list) behind a store-level RwLock,
//! independent of each post's own lock. Insertion order is preserved for
//! listing. Lookups clone the `Arc<Post>` and release the store lock
//! before touching the per-post lock, so the two lock scopes never nest
//! across posts.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::auth::Claims;
use crate::forum::post::{Post, PostContent, PostView, VoteValue};
use crate::types::{AgoraError, Result};

/// Parameters for creating a post
#[derive(Debug)]
pub struct NewPost {
    pub title: String,
    pub category: String,
    pub content: PostContent,
}

/// Ordered collection of post aggregates
#[derive(Default)]
pub struct PostStore {
    posts: RwLock<Vec<Arc<Post>>>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_posts(&self) -> RwLockReadGuard<'_, Vec<Arc<Post>>> {
        self.posts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_posts(&self) -> RwLockWriteGuard<'_, Vec<Arc<Post>>> {
        self.posts.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locate a post and hand back its aggregate with the store lock
    /// already released.
    fn find(&self, id: &str) -> Result<Arc<Post>> {
        self.read_posts()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| AgoraError::NotFound(format!("post {}", id)))
    }

    /// Create a post authored by the calling identity. Always succeeds.
    pub fn create(&self, author: &Claims, new: NewPost) -> PostView {
        let post = Arc::new(Post::new(author, new.title, new.category, new.content));
        let view = post.snapshot();

        self.write_posts().push(post);
        debug!(post_id = %view.id, author = %author.username, "Created post");
        view
    }

    /// All posts, insertion order. Never touches view counts.
    pub fn list(&self) -> Vec<PostView> {
        self.read_posts().iter().map(|p| p.snapshot()).collect()
    }

    /// Posts in one category, insertion order; empty when none match.
    pub fn list_by_category(&self, category: &str) -> Vec<PostView> {
        self.read_posts()
            .iter()
            .filter(|p| p.category == category)
            .map(|p| p.snapshot())
            .collect()
    }

    /// Posts by author display name, insertion order; empty when none match.
    pub fn list_by_author(&self, username: &str) -> Vec<PostView> {
        self.read_posts()
            .iter()
            .filter(|p| p.author.username == username)
            .map(|p| p.snapshot())
            .collect()
    }

    /// Fetch one post by id, counting the view. The snapshot reflects the
    /// increment.
    pub fn get(&self, id: &str) -> Result<PostView> {
        Ok(self.find(id)?.record_view())
    }

    /// Remove a post. Only its author may do so; an existing post with a
    /// different owner is `Forbidden`, an unknown id is `NotFound`.
    pub fn delete(&self, id: &str, requester: &Claims) -> Result<()> {
        let mut posts = self.write_posts();
        let idx = posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| AgoraError::NotFound(format!("post {}", id)))?;

        if posts[idx].author.id != requester.id {
            return Err(AgoraError::Forbidden(
                "only the author may delete a post".into(),
            ));
        }

        posts.remove(idx);
        debug!(post_id = id, "Deleted post");
        Ok(())
    }

    /// Apply one subject's vote to a post.
    pub fn vote(&self, post_id: &str, voter: &Claims, value: VoteValue) -> Result<PostView> {
        Ok(self.find(post_id)?.vote(&voter.id, value))
    }

    /// Append a comment to a post.
    pub fn add_comment(&self, post_id: &str, author: &Claims, body: String) -> Result<PostView> {
        Ok(self.find(post_id)?.add_comment(author, body))
    }

    /// Delete a comment from a post (post-owner authorization, see
    /// [`Post::delete_comment`]).
    pub fn delete_comment(
        &self,
        post_id: &str,
        comment_id: &str,
        requester: &Claims,
    ) -> Result<PostView> {
        self.find(post_id)?.delete_comment(comment_id, requester)
    }

    pub fn post_count(&self) -> usize {
        self.read_posts().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn text(title: &str, category: &str) -> NewPost {
        NewPost {
            title: title.into(),
            category: category.into(),
            content: PostContent::Text("body".into()),
        }
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let store = PostStore::new();
        let alice = Claims::new("u1", "alice");

        store.create(&alice, text("first", "music"));
        store.create(&alice, text("second", "news"));
        store.create(&alice, text("third", "music"));

        let titles: Vec<_> = store.list().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_category_and_author_filters() {
        let store = PostStore::new();
        let alice = Claims::new("u1", "alice");
        let bob = Claims::new("u2", "bob");

        store.create(&alice, text("a", "music"));
        store.create(&bob, text("b", "news"));
        store.create(&alice, text("c", "music"));

        assert_eq!(store.list_by_category("music").len(), 2);
        assert_eq!(store.list_by_category("cooking").len(), 0);
        assert_eq!(store.list_by_author("bob").len(), 1);
        assert_eq!(store.list_by_author("nobody").len(), 0);
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let store = PostStore::new();
        match store.get("missing") {
            Err(AgoraError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_get_counts_views_but_listing_does_not() {
        let store = PostStore::new();
        let alice = Claims::new("u1", "alice");
        let id = store.create(&alice, text("a", "music")).id;

        for _ in 0..5 {
            store.get(&id).unwrap();
        }
        store.list();
        store.list_by_category("music");
        store.list_by_author("alice");

        assert_eq!(store.get(&id).unwrap().views, 6);
    }

    #[test]
    fn test_delete_requires_ownership() {
        let store = PostStore::new();
        let alice = Claims::new("u1", "alice");
        let bob = Claims::new("u2", "bob");
        let id = store.create(&alice, text("a", "music")).id;

        match store.delete(&id, &bob) {
            Err(AgoraError::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {:?}", other),
        }
        assert_eq!(store.post_count(), 1);

        store.delete(&id, &alice).unwrap();
        assert!(store.list().is_empty());

        match store.delete(&id, &alice) {
            Err(AgoraError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_comment_flow_through_store() {
        let store = PostStore::new();
        let alice = Claims::new("u1", "alice");
        let bob = Claims::new("u2", "bob");
        let id = store.create(&alice, text("a", "music")).id;

        let view = store.add_comment(&id, &bob, "nice post".into()).unwrap();
        let comment_id = view.comments[0].id.clone();

        match store.delete_comment(&id, &comment_id, &bob) {
            Err(AgoraError::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {:?}", other),
        }

        let after = store.delete_comment(&id, &comment_id, &alice).unwrap();
        assert!(after.comments.is_empty());
    }

    #[test]
    fn test_concurrent_votes_are_not_lost() {
        let store = Arc::new(PostStore::new());
        let alice = Claims::new("u1", "alice");
        let id = store.create(&alice, text("a", "music")).id;

        let handles: Vec<_> = (0..2)
            .map(|n| {
                let store = Arc::clone(&store);
                let id = id.clone();
                thread::spawn(move || {
                    let voter = Claims::new(format!("voter-{}", n), format!("voter-{}", n));
                    store.vote(&id, &voter, VoteValue::Up).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let view = store.list().pop().unwrap();
        assert_eq!(view.score, 3);
        assert_eq!(view.votes.len(), 2);
        assert_eq!(view.upvote_percentage, 100);
    }

    #[test]
    fn test_many_concurrent_mixed_votes_keep_invariant() {
        let store = Arc::new(PostStore::new());
        let alice = Claims::new("u1", "alice");
        let id = store.create(&alice, text("a", "music")).id;

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let store = Arc::clone(&store);
                let id = id.clone();
                thread::spawn(move || {
                    let voter = Claims::new(format!("voter-{}", n), format!("voter-{}", n));
                    let value = if n % 2 == 0 { VoteValue::Up } else { VoteValue::Down };
                    store.vote(&id, &voter, value).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let view = store.get(&id).unwrap();
        let ledger_sum: i64 = view.votes.iter().map(|v| v.value).sum();
        assert_eq!(view.votes.len(), 16);
        assert_eq!(view.score, 1 + ledger_sum);
        assert_eq!(view.upvote_percentage, 50);
    }

    #[test]
    fn test_deleted_post_absent_from_listing() {
        let store = PostStore::new();
        let alice = Claims::new("u1", "alice");

        let keep = store.create(&alice, text("keep", "music")).id;
        let drop = store.create(&alice, text("drop", "music")).id;

        store.delete(&drop, &alice).unwrap();

        let ids: Vec<_> = store.list().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![keep]);
    }
}
