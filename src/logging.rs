use std::fs::OpenOptions;

use env_logger::{Builder, Env, Target};

use crate::error::FeedError;
use crate::models::session::get_session_dir;

/// Logs go to a file next to the session so they never draw over the TUI.
/// `RUST_LOG` wins over `verbose`.
pub fn init(verbose: bool) -> Result<(), FeedError> {
    let path = get_session_dir()?.join("feedtui.log");
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let default_level = if verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|e| FeedError::Config(format!("Failed to initialise logging: {}", e)))
}
