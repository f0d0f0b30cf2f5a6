use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::controllers::feed_controller::{Completion, Confirmation, FeedController, FeedSource};
use crate::error::FeedError;
use crate::models::{realtime, Config, FeedEvent, PostId};
use crate::views::tui::{self, Screen, Tui};
use crate::views::ListCursor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Mine,
    Liked,
    Deleted,
}

impl View {
    fn next(self) -> View {
        match self {
            View::Mine => View::Liked,
            View::Liked => View::Deleted,
            View::Deleted => View::Mine,
        }
    }

    fn title(self) -> &'static str {
        match self {
            View::Mine => "My posts",
            View::Liked => "Liked posts",
            View::Deleted => "Deleted posts",
        }
    }
}

enum Mode {
    Browse,
    Commenting { post_id: PostId, text: String },
    ConfirmDelete(PostId),
}

#[derive(PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

const HELP: &str = "j/k move  l like  c comment  d delete  u restore  n/p page  tab view  r refresh  q quit";

/// Status line text for a failure. Local rejections changed nothing.
fn describe(error: &FeedError) -> String {
    if error.is_precondition() {
        format!("Rejected: {}", error)
    } else {
        format!("Failed: {}", error)
    }
}

pub struct App {
    controller: FeedController,
    completions: UnboundedReceiver<Completion>,
    view: View,
    cursor: ListCursor,
    mode: Mode,
    status: String,
    page: u32,
    page_size: u32,
}

pub async fn start_app(
    controller: FeedController,
    completions: UnboundedReceiver<Completion>,
    config: &Config,
) -> Result<(), FeedError> {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let url = config.realtime_url();
    let viewer_id = config.viewer_id.clone();
    tokio::spawn(async move {
        if let Err(e) = realtime::subscribe(&url, viewer_id, events_tx).await {
            log::warn!("Live updates unavailable: {}", e);
        }
    });

    let mut app = App::new(controller, completions, config.page_size);
    app.reload().await;

    let mut terminal = tui::setup_terminal()?;
    let res = app.run(&mut terminal, events_rx).await;
    tui::restore_terminal(&mut terminal)?;
    res
}

impl App {
    pub fn new(controller: FeedController, completions: UnboundedReceiver<Completion>, page_size: u32) -> Self {
        let cursor = ListCursor::new(controller.items().len());
        Self {
            controller,
            completions,
            view: View::Mine,
            cursor,
            mode: Mode::Browse,
            status: HELP.to_string(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    fn source(&self) -> FeedSource {
        match self.view {
            View::Mine => FeedSource::Mine,
            View::Liked => FeedSource::Liked,
            View::Deleted => FeedSource::Deleted { page: self.page, limit: self.page_size },
        }
    }

    async fn reload(&mut self) {
        match self.controller.load(self.source()).await {
            Ok(()) => self.status = HELP.to_string(),
            Err(e) => self.status = describe(&e),
        }
        self.cursor.reset(self.controller.items().len());
    }

    fn selected_id(&self) -> Option<PostId> {
        self.cursor
            .selected()
            .and_then(|i| self.controller.items().get(i))
            .map(|item| item.id().clone())
    }

    fn report(&mut self, result: Result<(), FeedError>, success: &str) {
        self.status = match result {
            Ok(()) => success.to_string(),
            Err(e) => describe(&e),
        };
    }

    fn title(&self) -> String {
        match (self.view, self.controller.page()) {
            (View::Deleted, Some(page)) => format!(
                "{} (page {}/{})",
                self.view.title(),
                self.page,
                page.total_pages.map_or("?".to_string(), |t| t.to_string())
            ),
            _ => self.view.title().to_string(),
        }
    }

    fn prompt(&self) -> Option<String> {
        match &self.mode {
            Mode::Browse => None,
            Mode::Commenting { text, .. } => Some(format!("Comment (enter to send, esc to cancel): {}", text)),
            Mode::ConfirmDelete(id) => Some(format!("Delete post {}? [y/N]", id)),
        }
    }

    fn on_completion(&mut self, completion: Completion) {
        let success = match &completion {
            Completion::Like { .. } => "Liked",
            Completion::Comment { .. } => "Comment posted",
            Completion::Delete { .. } => "Post deleted",
            Completion::Event(FeedEvent::PostDeleted(_)) => "A post was removed",
            Completion::Event(_) => "",
        };
        let result = self.controller.apply(completion);
        if !success.is_empty() || result.is_err() {
            self.report(result, success);
        }
        self.cursor.clamp(self.controller.items().len());
    }

    pub async fn run(&mut self, terminal: &mut Tui, mut events: UnboundedReceiver<FeedEvent>) -> Result<(), FeedError> {
        let mut input = EventStream::new();
        loop {
            let title = self.title();
            let prompt = self.prompt();
            let screen = Screen {
                title: &title,
                status: &self.status,
                prompt: prompt.as_deref(),
            };
            let items = self.controller.items();
            let cursor = &mut self.cursor;
            terminal.draw(|f| tui::render_ui(f, items, cursor, &screen))?;

            tokio::select! {
                maybe_event = input.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key).await == Flow::Quit {
                            return Ok(());
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(()),
                },
                Some(completion) = self.completions.recv() => self.on_completion(completion),
                Some(event) = events.recv() => self.on_completion(Completion::Event(event)),
            }
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Flow {
        match std::mem::replace(&mut self.mode, Mode::Browse) {
            Mode::Browse => return self.handle_browse_key(key).await,
            Mode::Commenting { post_id, mut text } => match key.code {
                KeyCode::Esc => self.status = HELP.to_string(),
                KeyCode::Enter => {
                    let result = self.controller.add_comment(&post_id, &text);
                    self.report(result, "Sending comment...");
                }
                KeyCode::Backspace => {
                    text.pop();
                    self.mode = Mode::Commenting { post_id, text };
                }
                KeyCode::Char(c) => {
                    text.push(c);
                    self.mode = Mode::Commenting { post_id, text };
                }
                _ => self.mode = Mode::Commenting { post_id, text },
            },
            Mode::ConfirmDelete(post_id) => {
                let confirmation = match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => Confirmation::Confirmed,
                    _ => Confirmation::Declined,
                };
                let result = self.controller.delete_post(&post_id, confirmation);
                self.report(result, "Deleting...");
            }
        }
        Flow::Continue
    }

    async fn handle_browse_key(&mut self, key: KeyEvent) -> Flow {
        let len = self.controller.items().len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Down | KeyCode::Char('j') => self.cursor.next(len),
            KeyCode::Up | KeyCode::Char('k') => self.cursor.previous(len),
            KeyCode::PageDown => self.cursor.jump_down(5, len),
            KeyCode::PageUp => self.cursor.jump_up(5, len),
            KeyCode::Char('g') => self.cursor.first(len),
            KeyCode::Char('G') => self.cursor.last(len),
            KeyCode::Tab => {
                self.view = self.view.next();
                self.page = 1;
                self.reload().await;
            }
            KeyCode::Char('r') => {
                self.status = "Refreshing...".to_string();
                self.reload().await;
            }
            KeyCode::Char('l') if self.view != View::Deleted => {
                if let Some(id) = self.selected_id() {
                    let result = self.controller.like(&id);
                    self.report(result, "Liking...");
                }
            }
            KeyCode::Char('c') if self.view != View::Deleted => {
                if let Some(post_id) = self.selected_id() {
                    self.mode = Mode::Commenting { post_id, text: String::new() };
                }
            }
            KeyCode::Char('d') if self.view == View::Mine => {
                if let Some(id) = self.selected_id() {
                    self.mode = Mode::ConfirmDelete(id);
                }
            }
            KeyCode::Char('u') if self.view == View::Deleted => {
                if let Some(id) = self.selected_id() {
                    match self.controller.restore_post(&id).await {
                        Ok(_) => {
                            self.reload().await;
                            self.status = format!("Restored {}", id);
                        }
                        Err(e) => self.status = describe(&e),
                    }
                }
            }
            KeyCode::Char('n') if self.view == View::Deleted => {
                let last = self.controller.page().and_then(|p| p.total_pages);
                if last.map_or(true, |last| self.page < last) {
                    self.page += 1;
                    self.reload().await;
                }
            }
            KeyCode::Char('p') if self.view == View::Deleted && self.page > 1 => {
                self.page -= 1;
                self.reload().await;
            }
            _ => {}
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_separates_rejections_from_failures() {
        assert_eq!(describe(&FeedError::AlreadyLiked), "Rejected: You already liked this post");
        assert_eq!(describe(&FeedError::Timeout), "Failed: Request timed out");
        assert_eq!(
            describe(&FeedError::Status { operation: "Like".into(), status: 500 }),
            "Failed: Like failed with status 500"
        );
    }

    #[test]
    fn tab_cycles_views() {
        assert_eq!(View::Mine.next(), View::Liked);
        assert_eq!(View::Liked.next(), View::Deleted);
        assert_eq!(View::Deleted.next(), View::Mine);
    }
}
