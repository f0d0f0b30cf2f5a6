use std::io;
use chrono::{DateTime, Utc};
use ratatui::{
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    layout::{Layout, Constraint, Direction},
    style::{Style, Color, Modifier},
    Terminal, Frame,
    text::Line,
    prelude::{Span, Text},
};
use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    execute,
    event::{DisableMouseCapture, EnableMouseCapture},
};

use crate::controllers::FeedItemController;
use crate::models::CommentId;
use crate::views::widgets::ListCursor;

pub type Tui = Terminal<ratatui::backend::CrosstermBackend<io::Stdout>>;

const SHOWN_COMMENTS: usize = 3;

pub fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

pub fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()
}

pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let hours = (now - then).num_hours();
    if hours < 1 {
        "Less than 1 hour ago".to_string()
    } else if hours < 24 {
        format!("{} hour(s) ago", hours)
    } else {
        format!("{} day(s) ago", hours / 24)
    }
}

/// What one frame shows besides the posts themselves.
pub struct Screen<'a> {
    pub title: &'a str,
    pub status: &'a str,
    pub prompt: Option<&'a str>,
}

fn post_lines(item: &FeedItemController, now: DateTime<Utc>) -> Vec<Line<'_>> {
    let post = item.post();

    let when = post.updated_at.unwrap_or(post.created_at);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                post.author.name.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", time_ago(when, now)), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
    ];
    lines.extend(Text::raw(post.text.as_str()).lines);
    if let Some(image) = &post.image_url {
        lines.push(Line::from(Span::styled(format!("[image] {}", image), Style::default().fg(Color::Blue))));
    }

    let mut stats = vec![Span::raw(format!("♥ {} Likes", post.like_count))];
    if post.viewer_has_liked {
        stats.push(Span::styled(" (liked)", Style::default().fg(Color::Magenta)));
    }
    if item.like_in_flight() {
        stats.push(Span::styled(" ...", Style::default().fg(Color::Yellow)));
    }
    stats.push(Span::raw(format!("   💬 {} Comments", post.comments.len())));
    lines.push(Line::from(stats));

    let skip = post.comments.len().saturating_sub(SHOWN_COMMENTS);
    for comment in post.comments.iter().skip(skip) {
        let style = match comment.id {
            CommentId::Temporary(_) => Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            CommentId::Server(_) => Style::default(),
        };
        lines.push(Line::from(Span::styled(format!("  › {}", comment.text), style)));
    }

    if let Some(error) = item.error() {
        lines.push(Line::from(Span::styled(format!("! {}", error), Style::default().fg(Color::Red))));
    }
    lines.push(Line::from(""));
    lines
}

pub fn render_ui<B: ratatui::backend::Backend>(
    f: &mut Frame<B>,
    items: &[FeedItemController],
    cursor: &mut ListCursor,
    screen: &Screen,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(3), Constraint::Length(3)].as_ref())
        .split(f.size());

    let now = Utc::now();
    let list_items: Vec<ListItem> = items
        .iter()
        .map(|item| ListItem::new(post_lines(item, now)).style(Style::default()))
        .collect();

    let list = List::new(list_items)
        .block(Block::default().title(screen.title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Gray)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        );

    f.render_stateful_widget(list, chunks[0], &mut cursor.state);

    let footer = match screen.prompt {
        Some(prompt) => Paragraph::new(prompt).block(Block::default().title("Input").borders(Borders::ALL)),
        None => Paragraph::new(screen.status).block(Block::default().borders(Borders::ALL)),
    };
    f.render_widget(footer.wrap(Wrap { trim: true }), chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(time_ago(now - Duration::minutes(59), now), "Less than 1 hour ago");
        assert_eq!(time_ago(now - Duration::hours(5), now), "5 hour(s) ago");
        assert_eq!(time_ago(now - Duration::hours(49), now), "2 day(s) ago");
    }
}
