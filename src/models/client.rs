use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;

use crate::error::FeedError;
use crate::models::post::{Post, PostEnvelope, PostId, PostPage, PostsEnvelope};
use crate::models::session::Credential;

/// The remote source of truth for posts.
#[async_trait]
pub trait PostService: Send + Sync {
    async fn list_deleted_posts(&self, credential: &Credential, page: u32, limit: u32) -> Result<PostPage, FeedError>;

    async fn restore_post(&self, credential: &Credential, id: &PostId) -> Result<Post, FeedError>;

    async fn list_my_posts(&self, credential: &Credential) -> Result<Vec<Post>, FeedError>;

    async fn list_liked_posts(&self, credential: &Credential) -> Result<Vec<Post>, FeedError>;

    /// Returns the post with its authoritative like count and like state.
    async fn toggle_like(&self, credential: &Credential, id: &PostId) -> Result<Post, FeedError>;

    /// Returns the post with its full, canonical comment list.
    async fn add_comment(&self, credential: &Credential, id: &PostId, text: &str) -> Result<Post, FeedError>;

    async fn delete_post(&self, credential: &Credential, id: &PostId) -> Result<(), FeedError>;
}

#[derive(Clone)]
pub struct HttpPostService {
    client: Client,
    base_url: String,
    viewer_id: Option<String>,
    user_agent: String,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    text: &'a str,
}

impl HttpPostService {
    pub fn new(base_url: impl Into<String>, viewer_id: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            viewer_id,
            user_agent: format!("feedtui-{}", env!("CARGO_PKG_VERSION")),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/post/{}", self.base_url, path)
    }

    fn request(&self, builder: RequestBuilder, credential: &Credential) -> RequestBuilder {
        builder
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .bearer_auth(credential.bearer())
    }

    fn check_response(operation: &str, response: &reqwest::Response) -> Result<(), FeedError> {
        let status = response.status();
        if !status.is_success() {
            log::warn!("{} to {} failed with status {}", operation, response.url(), status);
            return Err(FeedError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn send_for_post(&self, operation: &str, builder: RequestBuilder) -> Result<Post, FeedError> {
        let response = builder.send().await?;
        Self::check_response(operation, &response)?;
        let envelope: PostEnvelope = response.json().await?;
        Ok(envelope.post.into_post(self.viewer_id.as_deref()))
    }

    async fn send_for_posts(&self, operation: &str, builder: RequestBuilder) -> Result<PostsEnvelope, FeedError> {
        let response = builder.send().await?;
        Self::check_response(operation, &response)?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl PostService for HttpPostService {
    async fn list_deleted_posts(&self, credential: &Credential, page: u32, limit: u32) -> Result<PostPage, FeedError> {
        let builder = self.request(
            self.client
                .get(self.url("deletedposts"))
                .query(&[("page", page), ("limit", limit)]),
            credential,
        );
        let envelope = self.send_for_posts("Fetch deleted posts", builder).await?;
        Ok(envelope.into_page(self.viewer_id.as_deref()))
    }

    async fn restore_post(&self, credential: &Credential, id: &PostId) -> Result<Post, FeedError> {
        let builder = self.request(self.client.put(self.url(&format!("restore/{}", id))), credential);
        self.send_for_post("Restore post", builder).await
    }

    async fn list_my_posts(&self, credential: &Credential) -> Result<Vec<Post>, FeedError> {
        let builder = self.request(self.client.get(self.url("myposts")), credential);
        let envelope = self.send_for_posts("Fetch my posts", builder).await?;
        Ok(envelope.into_posts(self.viewer_id.as_deref()))
    }

    async fn list_liked_posts(&self, credential: &Credential) -> Result<Vec<Post>, FeedError> {
        let builder = self.request(self.client.get(self.url("likedposts")), credential);
        let envelope = self.send_for_posts("Fetch liked posts", builder).await?;
        Ok(envelope.into_posts(self.viewer_id.as_deref()))
    }

    async fn toggle_like(&self, credential: &Credential, id: &PostId) -> Result<Post, FeedError> {
        let builder = self.request(self.client.post(self.url(&format!("like/{}", id))), credential);
        self.send_for_post("Like", builder).await
    }

    async fn add_comment(&self, credential: &Credential, id: &PostId, text: &str) -> Result<Post, FeedError> {
        let builder = self.request(
            self.client
                .post(self.url(&format!("comment/{}", id)))
                .json(&CommentBody { text }),
            credential,
        );
        self.send_for_post("Comment", builder).await
    }

    async fn delete_post(&self, credential: &Credential, id: &PostId) -> Result<(), FeedError> {
        let builder = self.request(self.client.delete(self.url(&format!("delete/{}", id))), credential);
        let response = builder.send().await?;
        Self::check_response("Delete post", &response)
    }
}
