use std::io;
use thiserror::Error;
use serde::{Serialize, Deserialize};

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedError {
    #[error("Not signed in: no credential available")]
    MissingCredential,

    #[error("Comment text is empty")]
    EmptyComment,

    #[error("You cannot like your own post")]
    SelfLike,

    #[error("You already liked this post")]
    AlreadyLiked,

    #[error("A like for this post is already in progress")]
    LikeInFlight,

    #[error("Invalid pagination: page {page}, limit {limit}")]
    InvalidPage { page: u32, limit: u32 },

    #[error("Deletion was not confirmed")]
    NotConfirmed,

    #[error("Unknown post: {0}")]
    UnknownPost(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{operation} failed with status {status}")]
    Status { operation: String, status: u16 },

    #[error("Request timed out")]
    Timeout,

    #[error("JSON error: {0}")]
    Json(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Realtime error: {0}")]
    Realtime(String),
}

impl FeedError {
    /// Rejected locally: nothing was mutated and no request went out.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            FeedError::MissingCredential
                | FeedError::EmptyComment
                | FeedError::SelfLike
                | FeedError::AlreadyLiked
                | FeedError::LikeInFlight
                | FeedError::InvalidPage { .. }
                | FeedError::NotConfirmed
                | FeedError::UnknownPost(_)
        )
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Json(err.to_string())
    }
}

impl From<io::Error> for FeedError {
    fn from(err: io::Error) -> Self {
        FeedError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout
        } else if err.is_decode() {
            FeedError::Json(err.to_string())
        } else {
            FeedError::Network(err.to_string())
        }
    }
}

impl From<tokio::time::error::Elapsed> for FeedError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        FeedError::Timeout
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for FeedError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        FeedError::Realtime(err.to_string())
    }
}
