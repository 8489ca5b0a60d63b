//! Server-Sent Events (SSE) utilities
//!
//! Turns a [`TopicBus`] subscription into an Axum SSE response.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

use crate::events::{TopicBus, TopicMessage};

/// Convert a bus message into an SSE event
///
/// The SSE `event` field carries the topic and `data` carries the JSON payload.
pub fn to_sse_event(message: &TopicMessage) -> Option<Event> {
    Event::default()
        .id(message.id.clone())
        .event(message.topic.clone())
        .json_data(&message.payload)
        .ok()
}

/// Create an SSE stream of bus messages
///
/// # Arguments
/// * `bus` - Bus to subscribe to
/// * `topic` - Only forward messages on this topic; `None` forwards everything
pub fn create_topic_sse_stream(
    bus: &TopicBus,
    topic: Option<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(
        "New SSE client connected (topic: {}), total subscribers: {}",
        topic.as_deref().unwrap_or("*"),
        bus.subscriber_count() + 1
    );

    let rx = bus.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        let topic = topic.clone();
        async move {
            match result {
                Ok(message) => {
                    if topic.as_deref().is_some_and(|t| t != message.topic) {
                        return None;
                    }
                    debug!("SSE: forwarding message on {}", message.topic);
                    to_sse_event(&message).map(Ok)
                }
                Err(e) => {
                    // Lagged subscriber: older messages were dropped
                    warn!("SSE client error: {:?}", e);
                    None
                }
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
