pub mod models;
pub mod views;
pub mod controllers;
pub mod cli;
pub mod error;
pub mod logging;

// Re-exports for convenience
pub use models::{Config, HttpPostService, Post, PostService};
pub use controllers::{start_app, FeedController, FeedItemController};
pub use error::FeedError;
