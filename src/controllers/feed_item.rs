//! Optimistic state for a single post in a feed.
//!
//! Every optimistic mutation made here ends in exactly one of
//! [`FeedItemController::resolve_like`] / [`FeedItemController::resolve_comment`]
//! with either the server's answer or the failure that rolls it back.

use crate::error::FeedError;
use crate::models::{Comment, CommentId, Post, PostId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LikeSnapshot {
    pub like_count: u64,
    pub viewer_has_liked: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LikeState {
    Idle,
    InFlight { snapshot: LikeSnapshot },
}

/// Handle for an optimistically inserted comment awaiting the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingComment {
    pub temp_id: u64,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct FeedItemController {
    post: Post,
    like_state: LikeState,
    next_temp_id: u64,
    error: Option<String>,
}

impl FeedItemController {
    pub fn new(post: Post) -> Self {
        Self {
            post,
            like_state: LikeState::Idle,
            next_temp_id: 0,
            error: None,
        }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn id(&self) -> &PostId {
        &self.post.id
    }

    pub fn like_state(&self) -> LikeState {
        self.like_state
    }

    pub fn like_in_flight(&self) -> bool {
        matches!(self.like_state, LikeState::InFlight { .. })
    }

    pub fn pending_comments(&self) -> usize {
        self.post.comments.iter().filter(|c| c.id.is_temporary()).count()
    }

    /// Last failure for this post, shown until the next successful action.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn record_error(&mut self, error: &FeedError) {
        self.error = Some(error.to_string());
    }

    fn snapshot(&self) -> LikeSnapshot {
        LikeSnapshot {
            like_count: self.post.like_count,
            viewer_has_liked: self.post.viewer_has_liked,
        }
    }

    /// Optimistically likes the post. Self-likes can only be caught here when
    /// the viewer id is known.
    pub fn like(&mut self, viewer_id: Option<&str>) -> Result<(), FeedError> {
        if self.like_in_flight() {
            return Err(FeedError::LikeInFlight);
        }
        if viewer_id.is_some_and(|viewer| viewer == self.post.author.id) {
            return Err(FeedError::SelfLike);
        }
        if self.post.viewer_has_liked {
            return Err(FeedError::AlreadyLiked);
        }

        self.like_state = LikeState::InFlight { snapshot: self.snapshot() };
        self.post.like_count += 1;
        self.post.viewer_has_liked = true;
        Ok(())
    }

    /// Keeps a like that is still pending on `previous`, an older copy of this
    /// post, when the view is reloaded. The fresh values become the rollback
    /// target.
    pub fn carry_pending_like(&mut self, previous: &FeedItemController) {
        if !previous.like_in_flight() {
            return;
        }
        self.like_state = LikeState::InFlight { snapshot: self.snapshot() };
        self.post.like_count = previous.post.like_count;
        self.post.viewer_has_liked = previous.post.viewer_has_liked;
    }

    pub fn resolve_like(&mut self, outcome: Result<Post, FeedError>) {
        let LikeState::InFlight { snapshot } = self.like_state else {
            log::debug!("Ignoring like resolution for idle post {}", self.post.id);
            return;
        };
        self.like_state = LikeState::Idle;

        match outcome {
            Ok(server) => {
                self.post.like_count = server.like_count;
                self.post.viewer_has_liked = server.viewer_has_liked;
                self.error = None;
            }
            Err(e) => {
                log::warn!("Like on {} failed, rolling back: {}", self.post.id, e);
                self.post.like_count = snapshot.like_count;
                self.post.viewer_has_liked = snapshot.viewer_has_liked;
                self.record_error(&e);
            }
        }
    }

    /// Appends the comment at the tail under a temporary id.
    pub fn add_comment(&mut self, text: &str) -> Result<PendingComment, FeedError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(FeedError::EmptyComment);
        }

        let temp_id = self.next_temp_id;
        self.next_temp_id += 1;
        self.post.comments.push(Comment {
            id: CommentId::Temporary(temp_id),
            text: text.to_string(),
            author_id: None,
        });
        Ok(PendingComment { temp_id, text: text.to_string() })
    }

    /// On success the server's list replaces the local one wholesale, which may
    /// also drop other comments still pending.
    pub fn resolve_comment(&mut self, pending: &PendingComment, outcome: Result<Post, FeedError>) {
        match outcome {
            Ok(server) => {
                self.post.comments = server.comments;
                self.error = None;
            }
            Err(e) => {
                log::warn!("Comment on {} failed, removing it: {}", self.post.id, e);
                let temp = CommentId::Temporary(pending.temp_id);
                self.post.comments.retain(|c| c.id != temp);
                self.record_error(&e);
            }
        }
    }

    /// Applies a live snapshot of this post pushed by the server.
    pub fn apply_update(&mut self, server: Post) {
        let server_likes = LikeSnapshot {
            like_count: server.like_count,
            viewer_has_liked: server.viewer_has_liked,
        };
        match &mut self.like_state {
            // The pending request resolves last; only the rollback target moves.
            LikeState::InFlight { snapshot } => *snapshot = server_likes,
            LikeState::Idle => {
                self.post.like_count = server_likes.like_count;
                self.post.viewer_has_liked = server_likes.viewer_has_liked;
            }
        }

        // Comments new to this snapshot may be pending ones the server has
        // already stored; each of those is shown once.
        let (mut pending, known): (Vec<Comment>, Vec<Comment>) = self
            .post
            .comments
            .drain(..)
            .partition(|c| c.id.is_temporary());
        let mut arrived: Vec<&str> = server
            .comments
            .iter()
            .filter(|s| !known.iter().any(|k| k.id == s.id))
            .map(|s| s.text.as_str())
            .collect();
        pending.retain(|c| match arrived.iter().position(|text| *text == c.text) {
            Some(at) => {
                arrived.swap_remove(at);
                false
            }
            None => true,
        });
        self.post.comments = server.comments;
        self.post.comments.extend(pending);

        self.post.author = server.author;
        self.post.text = server.text;
        self.post.image_url = server.image_url;
        self.post.updated_at = server.updated_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Author;
    use chrono::Utc;

    fn post(likes: u64, comments: &[&str]) -> Post {
        Post {
            id: PostId::from("p1"),
            author: Author {
                id: "author".into(),
                name: "author".into(),
                avatar_url: String::new(),
            },
            text: "hello".into(),
            image_url: None,
            like_count: likes,
            viewer_has_liked: false,
            comments: comments
                .iter()
                .map(|id| Comment {
                    id: CommentId::Server(id.to_string()),
                    text: format!("text {}", id),
                    author_id: None,
                })
                .collect(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn liked(likes: u64) -> Post {
        Post { viewer_has_liked: true, ..post(likes, &[]) }
    }

    #[test]
    fn like_is_optimistic() {
        let mut item = FeedItemController::new(post(3, &[]));
        item.like(Some("viewer")).unwrap();
        assert_eq!(item.post().like_count, 4);
        assert!(item.post().viewer_has_liked);
        assert!(item.like_in_flight());
    }

    #[test]
    fn like_success_takes_server_count() {
        let mut item = FeedItemController::new(post(3, &[]));
        item.like(Some("viewer")).unwrap();
        item.resolve_like(Ok(liked(5)));
        assert_eq!(item.post().like_count, 5);
        assert!(item.post().viewer_has_liked);
        assert_eq!(item.like_state(), LikeState::Idle);
    }

    #[test]
    fn like_failure_rolls_back() {
        let mut item = FeedItemController::new(post(3, &[]));
        item.like(Some("viewer")).unwrap();
        item.resolve_like(Err(FeedError::Status { operation: "Like".into(), status: 500 }));
        assert_eq!(item.post().like_count, 3);
        assert!(!item.post().viewer_has_liked);
        assert_eq!(item.like_state(), LikeState::Idle);
        assert_eq!(item.error(), Some("Like failed with status 500"));
    }

    #[test]
    fn second_like_while_in_flight_is_rejected() {
        let mut item = FeedItemController::new(post(0, &[]));
        item.like(Some("viewer")).unwrap();
        assert_eq!(item.like(Some("viewer")), Err(FeedError::LikeInFlight));
        assert_eq!(item.post().like_count, 1);
    }

    #[test]
    fn self_like_is_rejected() {
        let mut item = FeedItemController::new(post(2, &[]));
        assert_eq!(item.like(Some("author")), Err(FeedError::SelfLike));
        assert_eq!(item.post().like_count, 2);
        assert_eq!(item.like_state(), LikeState::Idle);
    }

    #[test]
    fn already_liked_is_rejected() {
        let mut item = FeedItemController::new(liked(2));
        assert_eq!(item.like(Some("viewer")), Err(FeedError::AlreadyLiked));
        assert_eq!(item.post().like_count, 2);
    }

    #[test]
    fn stray_like_resolution_is_ignored() {
        let mut item = FeedItemController::new(post(2, &[]));
        item.resolve_like(Ok(liked(9)));
        assert_eq!(item.post().like_count, 2);
    }

    #[test]
    fn blank_comments_do_nothing() {
        let mut item = FeedItemController::new(post(0, &[]));
        assert_eq!(item.add_comment(""), Err(FeedError::EmptyComment));
        assert_eq!(item.add_comment("   "), Err(FeedError::EmptyComment));
        assert!(item.post().comments.is_empty());
    }

    #[test]
    fn comment_is_visible_immediately() {
        let mut item = FeedItemController::new(post(0, &["c1"]));
        let pending = item.add_comment("  hello ").unwrap();
        assert_eq!(pending.text, "hello");
        let last = item.post().comments.last().unwrap();
        assert_eq!(last.id, CommentId::Temporary(pending.temp_id));
        assert_eq!(last.text, "hello");
        assert_eq!(item.pending_comments(), 1);
    }

    #[test]
    fn comment_success_replaces_whole_list() {
        let mut item = FeedItemController::new(post(0, &["c1"]));
        let pending = item.add_comment("hello").unwrap();
        item.resolve_comment(&pending, Ok(post(0, &["c1", "c2", "c3"])));
        let ids: Vec<_> = item.post().comments.iter().map(|c| c.id.clone()).collect();
        assert_eq!(
            ids,
            vec![
                CommentId::Server("c1".into()),
                CommentId::Server("c2".into()),
                CommentId::Server("c3".into()),
            ]
        );
        assert_eq!(item.pending_comments(), 0);
    }

    #[test]
    fn comment_failure_removes_only_its_own_entry() {
        let mut item = FeedItemController::new(post(0, &[]));
        let first = item.add_comment("nice!").unwrap();
        let second = item.add_comment("again").unwrap();
        assert_ne!(first.temp_id, second.temp_id);

        item.resolve_comment(&first, Err(FeedError::Timeout));
        assert_eq!(item.post().comments.len(), 1);
        assert_eq!(item.post().comments[0].text, "again");
        assert!(item.error().is_some());
    }

    #[test]
    fn failed_comment_after_overwrite_is_a_no_op() {
        let mut item = FeedItemController::new(post(0, &[]));
        let first = item.add_comment("one").unwrap();
        let second = item.add_comment("two").unwrap();
        item.resolve_comment(&second, Ok(post(0, &["s1", "s2"])));
        item.resolve_comment(&first, Err(FeedError::Network("reset".into())));
        assert_eq!(item.post().comments.len(), 2);
    }

    #[test]
    fn live_update_while_liking_moves_rollback_target() {
        let mut item = FeedItemController::new(post(3, &[]));
        item.like(Some("viewer")).unwrap();
        item.apply_update(post(7, &[]));
        assert_eq!(item.post().like_count, 4);

        item.resolve_like(Err(FeedError::Timeout));
        assert_eq!(item.post().like_count, 7);
    }

    #[test]
    fn live_update_keeps_pending_comments_at_tail() {
        let mut item = FeedItemController::new(post(0, &["c1"]));
        item.add_comment("mine").unwrap();
        item.apply_update(post(2, &["c1", "c2"]));
        assert_eq!(item.post().like_count, 2);
        let texts: Vec<_> = item.post().comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["text c1", "text c2", "mine"]);
    }

    #[test]
    fn live_update_holding_pending_comment_shows_it_once() {
        let mut item = FeedItemController::new(post(0, &["c1"]));
        let pending = item.add_comment("text c2").unwrap();
        item.apply_update(post(0, &["c1", "c2"]));
        let ids: Vec<_> = item.post().comments.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec![CommentId::Server("c1".into()), CommentId::Server("c2".into())]);
        assert_eq!(item.pending_comments(), 0);

        // The request's own answer still resolves cleanly afterwards.
        item.resolve_comment(&pending, Ok(post(0, &["c1", "c2"])));
        assert_eq!(item.post().comments.len(), 2);
    }

    #[test]
    fn live_update_keeps_pending_comment_matching_an_older_one() {
        let mut item = FeedItemController::new(post(0, &["c1"]));
        item.add_comment("text c1").unwrap();
        item.apply_update(post(0, &["c1"]));
        assert_eq!(item.post().comments.len(), 2);
        assert_eq!(item.pending_comments(), 1);
    }

    #[test]
    fn reload_carries_pending_like() {
        let mut old = FeedItemController::new(post(3, &[]));
        old.like(Some("viewer")).unwrap();

        let mut fresh = FeedItemController::new(post(6, &[]));
        fresh.carry_pending_like(&old);
        assert!(fresh.like_in_flight());
        assert_eq!(fresh.post().like_count, 4);
        assert_eq!(fresh.like(Some("viewer")), Err(FeedError::LikeInFlight));

        fresh.resolve_like(Err(FeedError::Timeout));
        assert_eq!(fresh.post().like_count, 6);
    }

    #[test]
    fn reload_of_idle_post_takes_fresh_values() {
        let old = FeedItemController::new(post(3, &[]));
        let mut fresh = FeedItemController::new(post(6, &[]));
        fresh.carry_pending_like(&old);
        assert_eq!(fresh.like_state(), LikeState::Idle);
        assert_eq!(fresh.post().like_count, 6);
    }
}
