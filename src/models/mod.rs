pub mod post;
pub mod client;
pub mod config;
pub mod session;
pub mod realtime;

// Re-export important structs for convenience
pub use post::{Author, Comment, CommentId, Post, PostId, PostPage};
pub use client::{HttpPostService, PostService};
pub use config::Config;
pub use session::{Credential, CredentialProvider};
pub use realtime::FeedEvent;
