pub mod app_controller;
pub mod feed_controller;
pub mod feed_item;
pub mod post_controller;

// Re-export key types
pub use app_controller::start_app;
pub use feed_controller::{Completion, Confirmation, FeedController, FeedSource};
pub use feed_item::{FeedItemController, LikeState, PendingComment};
