use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::timeout;

use crate::controllers::feed_item::{FeedItemController, PendingComment};
use crate::error::FeedError;
use crate::models::{Credential, CredentialProvider, FeedEvent, Post, PostId, PostPage, PostService};

/// Result of background work, handed back to the thread that owns the feed.
#[derive(Debug)]
pub enum Completion {
    Like { post_id: PostId, result: Result<Post, FeedError> },
    Comment { post_id: PostId, pending: PendingComment, result: Result<Post, FeedError> },
    Delete { post_id: PostId, result: Result<(), FeedError> },
    Event(FeedEvent),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedSource {
    Mine,
    Liked,
    Deleted { page: u32, limit: u32 },
}

/// Owns the posts of one view and drives their requests.
pub struct FeedController {
    service: Arc<dyn PostService>,
    credentials: Arc<dyn CredentialProvider>,
    viewer_id: Option<String>,
    request_timeout: Duration,
    source: Option<FeedSource>,
    items: Vec<FeedItemController>,
    page: Option<PostPage>,
    liking: HashSet<PostId>,
    deleting: HashSet<PostId>,
    completions: UnboundedSender<Completion>,
}

impl FeedController {
    pub fn new(
        service: Arc<dyn PostService>,
        credentials: Arc<dyn CredentialProvider>,
        viewer_id: Option<String>,
        request_timeout: Duration,
    ) -> (Self, UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            service,
            credentials,
            viewer_id,
            request_timeout,
            source: None,
            items: Vec::new(),
            page: None,
            liking: HashSet::new(),
            deleting: HashSet::new(),
            completions: tx,
        };
        (controller, rx)
    }

    pub fn items(&self) -> &[FeedItemController] {
        &self.items
    }

    pub fn item(&self, id: &PostId) -> Option<&FeedItemController> {
        self.items.iter().find(|i| i.id() == id)
    }

    fn item_mut(&mut self, id: &PostId) -> Option<&mut FeedItemController> {
        self.items.iter_mut().find(|i| i.id() == id)
    }

    /// Pagination info of the last deleted-posts page shown.
    pub fn page(&self) -> Option<&PostPage> {
        self.page.as_ref()
    }

    /// Replaces the shown posts. Likes and deletes still in flight stay
    /// tracked until their completion arrives.
    pub fn set_posts(&mut self, posts: Vec<Post>) {
        let previous = std::mem::take(&mut self.items);
        self.items = posts
            .into_iter()
            .map(|post| {
                let mut item = FeedItemController::new(post);
                if self.liking.contains(item.id()) {
                    if let Some(old) = previous.iter().find(|old| old.id() == item.id()) {
                        item.carry_pending_like(old);
                    }
                }
                item
            })
            .collect();
    }

    pub fn is_deleting(&self, id: &PostId) -> bool {
        self.deleting.contains(id)
    }

    fn credential(&self) -> Result<Credential, FeedError> {
        self.credentials.credential().ok_or(FeedError::MissingCredential)
    }

    async fn bounded<T>(&self, request: impl Future<Output = Result<T, FeedError>>) -> Result<T, FeedError> {
        timeout(self.request_timeout, request).await?
    }

    fn spawn_request<T, F, W>(&self, request: F, wrap: W)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, FeedError>> + Send + 'static,
        W: FnOnce(Result<T, FeedError>) -> Completion + Send + 'static,
    {
        let completions = self.completions.clone();
        let limit = self.request_timeout;
        tokio::spawn(async move {
            let result = match timeout(limit, request).await {
                Ok(result) => result,
                Err(_) => Err(FeedError::Timeout),
            };
            if completions.send(wrap(result)).is_err() {
                log::debug!("Feed dropped before request completed");
            }
        });
    }

    pub async fn load(&mut self, source: FeedSource) -> Result<(), FeedError> {
        let posts = match source {
            FeedSource::Mine => self.list_my_posts().await?,
            FeedSource::Liked => self.list_liked_posts().await?,
            FeedSource::Deleted { page, limit } => {
                let mut listing = self.list_deleted_posts(page, limit).await?;
                let posts = std::mem::take(&mut listing.posts);
                self.page = Some(listing);
                posts
            }
        };
        log::info!("Loaded {} posts for {:?}", posts.len(), source);
        self.source = Some(source);
        self.set_posts(posts);
        Ok(())
    }

    pub async fn list_my_posts(&self) -> Result<Vec<Post>, FeedError> {
        let credential = self.credential()?;
        self.bounded(self.service.list_my_posts(&credential)).await
    }

    pub async fn list_liked_posts(&self) -> Result<Vec<Post>, FeedError> {
        let credential = self.credential()?;
        self.bounded(self.service.list_liked_posts(&credential)).await
    }

    pub async fn list_deleted_posts(&self, page: u32, limit: u32) -> Result<PostPage, FeedError> {
        if page < 1 || limit < 1 {
            return Err(FeedError::InvalidPage { page, limit });
        }
        let credential = self.credential()?;
        self.bounded(self.service.list_deleted_posts(&credential, page, limit)).await
    }

    pub async fn restore_post(&self, id: &PostId) -> Result<Post, FeedError> {
        let credential = self.credential()?;
        let post = self.bounded(self.service.restore_post(&credential, id)).await?;
        log::info!("Restored post {}", id);
        Ok(post)
    }

    /// Likes a post optimistically and sends the request in the background.
    pub fn like(&mut self, id: &PostId) -> Result<(), FeedError> {
        let credential = self.credential()?;
        let source = self.source;
        let viewer_id = self.viewer_id.clone();
        let in_flight = self.liking.contains(id);
        let item = self
            .item_mut(id)
            .ok_or_else(|| FeedError::UnknownPost(id.to_string()))?;
        if in_flight {
            return Err(FeedError::LikeInFlight);
        }
        // Without a viewer id the post cannot tell who liked it, but the view can.
        match source {
            Some(FeedSource::Mine) => return Err(FeedError::SelfLike),
            Some(FeedSource::Liked) if viewer_id.is_none() => return Err(FeedError::AlreadyLiked),
            _ => {}
        }
        item.like(viewer_id.as_deref())?;
        self.liking.insert(id.clone());

        let service = Arc::clone(&self.service);
        let post_id = id.clone();
        self.spawn_request(
            async move { service.toggle_like(&credential, &post_id).await },
            {
                let post_id = id.clone();
                move |result| Completion::Like { post_id, result }
            },
        );
        Ok(())
    }

    pub fn add_comment(&mut self, id: &PostId, text: &str) -> Result<(), FeedError> {
        let credential = self.credential()?;
        let item = self
            .item_mut(id)
            .ok_or_else(|| FeedError::UnknownPost(id.to_string()))?;
        let pending = item.add_comment(text)?;

        let service = Arc::clone(&self.service);
        let post_id = id.clone();
        let body = pending.text.clone();
        self.spawn_request(
            async move { service.add_comment(&credential, &post_id, &body).await },
            {
                let post_id = id.clone();
                move |result| Completion::Comment { post_id, pending, result }
            },
        );
        Ok(())
    }

    /// Nothing is removed from the view until the server confirms.
    pub fn delete_post(&mut self, id: &PostId, confirmation: Confirmation) -> Result<(), FeedError> {
        if confirmation == Confirmation::Declined {
            return Err(FeedError::NotConfirmed);
        }
        let credential = self.credential()?;
        if !self.deleting.insert(id.clone()) {
            log::debug!("Delete of {} already in progress", id);
            return Ok(());
        }

        let service = Arc::clone(&self.service);
        let post_id = id.clone();
        self.spawn_request(
            async move { service.delete_post(&credential, &post_id).await },
            {
                let post_id = id.clone();
                move |result| Completion::Delete { post_id, result }
            },
        );
        Ok(())
    }

    /// Applies a completion and returns the outcome it carried.
    pub fn apply(&mut self, completion: Completion) -> Result<(), FeedError> {
        match completion {
            Completion::Like { post_id, result } => {
                self.liking.remove(&post_id);
                let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
                match self.item_mut(&post_id) {
                    Some(item) => item.resolve_like(result),
                    None => log::debug!("Like resolved for post {} no longer shown", post_id),
                }
                outcome
            }
            Completion::Comment { post_id, pending, result } => {
                let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
                match self.item_mut(&post_id) {
                    Some(item) => item.resolve_comment(&pending, result),
                    None => log::debug!("Comment resolved for post {} no longer shown", post_id),
                }
                outcome
            }
            Completion::Delete { post_id, result } => {
                self.deleting.remove(&post_id);
                match result {
                    Ok(()) => {
                        log::info!("Deleted post {}", post_id);
                        self.items.retain(|i| i.id() != &post_id);
                        Ok(())
                    }
                    Err(e) => {
                        log::warn!("Delete of {} failed: {}", post_id, e);
                        if let Some(item) = self.item_mut(&post_id) {
                            item.record_error(&e);
                        }
                        Err(e)
                    }
                }
            }
            Completion::Event(event) => {
                self.apply_event(event);
                Ok(())
            }
        }
    }

    pub fn apply_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::PostUpdated(post) => {
                let id = post.id.clone();
                if let Some(item) = self.item_mut(&id) {
                    log::debug!("Live update for post {}", id);
                    item.apply_update(post);
                }
            }
            FeedEvent::PostDeleted(id) => {
                self.items.retain(|i| i.id() != &id);
            }
        }
    }
}
