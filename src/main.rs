use std::sync::Arc;

use anyhow::{Context, Result};

use feedtui::cli::{Command, Flags};
use feedtui::controllers::{post_controller, start_app, Confirmation, FeedController, FeedSource};
use feedtui::logging;
use feedtui::models::session::{ChainedCredentials, Session, SessionFile, StaticCredential};
use feedtui::models::{Config, CredentialProvider, HttpPostService, PostId};

#[tokio::main]
async fn main() -> Result<()> {
    let flags = Flags::from_args();
    logging::init(flags.verbose).context("Failed to set up logging")?;

    let config = Config::load().context("Failed to load config")?;
    let session_file = SessionFile::default_location()?;

    match flags.command() {
        Command::Login { token, user_id } => {
            session_file.store(&Session { token, user_id })?;
            println!("Session saved");
            return Ok(());
        }
        Command::Logout => {
            session_file.clear()?;
            println!("Session cleared");
            return Ok(());
        }
        _ => {}
    }

    // The config's viewer id wins over the one remembered at login.
    let viewer_id = match &config.viewer_id {
        Some(id) => Some(id.clone()),
        None => session_file.load()?.and_then(|s| s.user_id),
    };
    let credentials = ChainedCredentials(vec![
        Box::new(StaticCredential::new(config.token.clone())) as Box<dyn CredentialProvider>,
        Box::new(session_file),
    ]);
    let service = HttpPostService::new(config.base_url.clone(), viewer_id.clone());
    let (mut controller, mut completions) = FeedController::new(
        Arc::new(service),
        Arc::new(credentials),
        viewer_id,
        config.request_timeout(),
    );
    log::info!("Starting against {}", config.base_url);

    match flags.command() {
        Command::Feed => start_app(controller, completions, &config).await?,
        Command::Mine => post_controller::print_feed(&mut controller, FeedSource::Mine).await?,
        Command::Liked => post_controller::print_feed(&mut controller, FeedSource::Liked).await?,
        Command::Deleted { page, limit } => {
            let limit = limit.unwrap_or(config.page_size);
            post_controller::print_feed(&mut controller, FeedSource::Deleted { page, limit }).await?
        }
        Command::Restore { id } => post_controller::restore(&controller, &PostId(id)).await?,
        Command::Comment { id, text } => {
            post_controller::comment(&mut controller, &mut completions, &PostId(id), text).await?
        }
        Command::Delete { id, yes } => {
            let confirmation = if yes {
                Confirmation::Confirmed
            } else {
                post_controller::confirm_on_stdin(&format!("Delete post {}?", id))?
            };
            post_controller::delete(&mut controller, &mut completions, &PostId(id), confirmation).await?
        }
        Command::Login { .. } | Command::Logout => {}
    }

    Ok(())
}
