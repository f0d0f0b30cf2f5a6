use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process::Command;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::controllers::feed_controller::{Completion, Confirmation, FeedController, FeedSource};
use crate::error::FeedError;
use crate::models::{Post, PostId};
use crate::views::tui::time_ago;

fn print_posts(posts: &[Post]) {
    let now = Utc::now();
    if posts.is_empty() {
        println!("No posts");
    }
    for post in posts {
        println!(
            "{}  @{}  {}  ♥ {}  💬 {}",
            post.id,
            post.author.name,
            time_ago(post.updated_at.unwrap_or(post.created_at), now),
            post.like_count,
            post.comments.len()
        );
        println!("    {}", post.text.replace('\n', "\n    "));
    }
}

pub async fn print_feed(controller: &mut FeedController, source: FeedSource) -> Result<(), FeedError> {
    controller.load(source).await?;
    let posts: Vec<Post> = controller.items().iter().map(|i| i.post().clone()).collect();
    print_posts(&posts);
    if let Some(page) = controller.page() {
        println!(
            "page {} of {} ({} total)",
            page.page.map_or("?".to_string(), |p| p.to_string()),
            page.total_pages.map_or("?".to_string(), |p| p.to_string()),
            page.total.map_or("?".to_string(), |t| t.to_string()),
        );
    }
    Ok(())
}

pub async fn restore(controller: &FeedController, id: &PostId) -> Result<(), FeedError> {
    let post = controller.restore_post(id).await?;
    println!("Restored {}", post.id);
    Ok(())
}

pub fn confirm_on_stdin(question: &str) -> Result<Confirmation, FeedError> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(if matches!(answer.trim(), "y" | "Y" | "yes") {
        Confirmation::Confirmed
    } else {
        Confirmation::Declined
    })
}

pub async fn delete(
    controller: &mut FeedController,
    completions: &mut UnboundedReceiver<Completion>,
    id: &PostId,
    confirmation: Confirmation,
) -> Result<(), FeedError> {
    controller.delete_post(id, confirmation)?;
    let completion = completions
        .recv()
        .await
        .ok_or_else(|| FeedError::Network("request task ended without a result".to_string()))?;
    controller.apply(completion)?;
    println!("Deleted {}", id);
    Ok(())
}

/// Comments on a post from the viewer's own or liked posts.
pub async fn comment(
    controller: &mut FeedController,
    completions: &mut UnboundedReceiver<Completion>,
    id: &PostId,
    text: Option<String>,
) -> Result<(), FeedError> {
    for source in [FeedSource::Mine, FeedSource::Liked] {
        controller.load(source).await?;
        if controller.item(id).is_some() {
            break;
        }
    }
    if controller.item(id).is_none() {
        return Err(FeedError::UnknownPost(id.to_string()));
    }

    let text = match text {
        Some(text) => text,
        None => compose_via_editor()?,
    };
    controller.add_comment(id, &text)?;

    let completion = completions
        .recv()
        .await
        .ok_or_else(|| FeedError::Network("request task ended without a result".to_string()))?;
    controller.apply(completion)?;

    if let Some(item) = controller.item(id) {
        println!("Commented on {} ({} comments)", id, item.post().comments.len());
    }
    Ok(())
}

/// Opens `$EDITOR` on a scratch file and returns what was written.
pub fn compose_via_editor() -> Result<String, FeedError> {
    let editor = env::var("EDITOR")
        .unwrap_or_else(|_| "vi".to_string());

    let mut temp_path = env::temp_dir();
    temp_path.push(format!("feedtui-comment-{}", std::process::id()));

    let status = Command::new(editor)
        .arg(&temp_path)
        .status()?;

    if !status.success() {
        let _ = fs::remove_file(&temp_path);
        return Err(FeedError::Io("Editor exited with non-zero status".to_string()));
    }

    let content = match fs::read_to_string(&temp_path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    let _ = fs::remove_file(&temp_path);
    Ok(content)
}
