use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const DEFAULT_AVATAR: &str = "https://ui-avatars.com/api/?name=User";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        PostId(id.to_string())
    }
}

/// A comment id is client-assigned until the server hands back its own.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommentId {
    Temporary(u64),
    Server(String),
}

impl CommentId {
    pub fn is_temporary(&self) -> bool {
        matches!(self, CommentId::Temporary(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub author_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub author: Author,
    pub text: String,
    pub image_url: Option<String>,
    pub like_count: u64,
    pub viewer_has_liked: bool,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One page of the deleted-posts listing, returned to callers as the service sent it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub page: Option<u32>,
    pub total_pages: Option<u32>,
    pub total: Option<u64>,
}

// Wire shapes of the Post Service.

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct UserDto {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "profilePic", default)]
    pub profile_pic: Option<String>,
}

/// The comment author arrives either populated or as a bare id.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    User(UserDto),
}

impl UserRef {
    fn id(&self) -> &str {
        match self {
            UserRef::Id(id) => id,
            UserRef::User(user) => &user.id,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct CommentDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub user: Option<UserRef>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct PostDto {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub user: Option<UserDto>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub likes: Vec<UserRef>,
    #[serde(default)]
    pub comments: Vec<CommentDto>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct PostsEnvelope {
    #[serde(default)]
    pub posts: Vec<PostDto>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(rename = "totalPages", default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct PostEnvelope {
    pub post: PostDto,
}

impl PostDto {
    /// `viewer_id` decides `viewer_has_liked`; without it nothing counts as liked.
    pub fn into_post(self, viewer_id: Option<&str>) -> Post {
        let user = self.user.unwrap_or_default();
        let name = user
            .username
            .filter(|n| !n.is_empty())
            .or(user.name.filter(|n| !n.is_empty()))
            .unwrap_or_else(|| "Unknown".to_string());
        let avatar_url = user
            .profile_pic
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_AVATAR.to_string());

        let viewer_has_liked = viewer_id
            .map(|viewer| self.likes.iter().any(|like| like.id() == viewer))
            .unwrap_or(false);

        Post {
            id: PostId(self.id),
            author: Author { id: user.id, name, avatar_url },
            text: self.text,
            image_url: self.image.filter(|i| !i.is_empty()),
            like_count: self.likes.len() as u64,
            viewer_has_liked,
            comments: comments_from_dtos(self.comments),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Keeps server order and drops repeated server ids, first one wins.
pub fn comments_from_dtos(dtos: Vec<CommentDto>) -> Vec<Comment> {
    let mut seen = HashSet::new();
    dtos.into_iter()
        .filter(|c| seen.insert(c.id.clone()))
        .map(|c| Comment {
            id: CommentId::Server(c.id),
            text: c.text,
            author_id: c.user.map(|u| u.id().to_string()),
        })
        .collect()
}

impl PostsEnvelope {
    pub fn into_posts(self, viewer_id: Option<&str>) -> Vec<Post> {
        self.posts.into_iter().map(|p| p.into_post(viewer_id)).collect()
    }

    pub fn into_page(self, viewer_id: Option<&str>) -> PostPage {
        PostPage {
            page: self.page,
            total_pages: self.total_pages,
            total: self.total,
            posts: self.posts.into_iter().map(|p| p.into_post(viewer_id)).collect(),
        }
    }
}
