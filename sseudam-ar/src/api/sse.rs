//! Server-Sent Events stream of live-channel topics

use axum::{
    extract::{Query, State},
    response::sse::{Event, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use sseudam_common::sse::create_topic_sse_stream;
use std::convert::Infallible;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// e.g. `/topic/ai-results`; all topics when omitted
    pub topic: Option<String>,
}

/// GET /events?topic=<topic>
pub async fn event_stream(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    create_topic_sse_stream(&state.event_bus, query.topic)
}

pub fn event_routes() -> Router<AppState> {
    Router::new().route("/events", get(event_stream))
}
