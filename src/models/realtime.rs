use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::error::FeedError;
use crate::models::post::{Post, PostDto, PostId};

/// Live notification pushed by the server, independent of any request.
#[derive(Clone, Debug, PartialEq)]
pub enum FeedEvent {
    PostUpdated(Post),
    PostDeleted(PostId),
}

#[derive(Deserialize)]
#[serde(tag = "event")]
enum WireEvent {
    #[serde(rename = "post:updated")]
    PostUpdated { post: PostDto },
    #[serde(rename = "post:deleted")]
    PostDeleted {
        #[serde(rename = "postId")]
        post_id: String,
    },
}

pub fn parse_event(text: &str, viewer_id: Option<&str>) -> Result<FeedEvent, FeedError> {
    let event = match serde_json::from_str::<WireEvent>(text)? {
        WireEvent::PostUpdated { post } => FeedEvent::PostUpdated(post.into_post(viewer_id)),
        WireEvent::PostDeleted { post_id } => FeedEvent::PostDeleted(PostId(post_id)),
    };
    Ok(event)
}

/// Reads events until the socket closes or the receiving side goes away.
pub async fn subscribe(
    url: &str,
    viewer_id: Option<String>,
    events: UnboundedSender<FeedEvent>,
) -> Result<(), FeedError> {
    let (mut socket, _) = connect_async(url).await?;
    log::info!("Subscribed to live updates at {}", url);

    while let Some(message) = socket.next().await {
        match message? {
            Message::Text(text) => match parse_event(&text, viewer_id.as_deref()) {
                Ok(event) => {
                    if events.send(event).is_err() {
                        break;
                    }
                }
                // Unknown event kinds are expected; the schema belongs to the server.
                Err(e) => log::debug!("Skipping live message: {}", e),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    log::info!("Live update channel closed");
    Ok(())
}
