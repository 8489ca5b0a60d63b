//! Topic-addressed event bus for live client updates
//!
//! Messages are published to a named topic and fanned out to every
//! subscriber; subscribers filter by topic (see [`crate::sse`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Topic for per-inspection analysis outcomes
pub const AI_RESULTS_TOPIC: &str = "/topic/ai-results";

/// Topic for camera activation signals sent to the inspection app
pub const CAMERA_TOPIC: &str = "/topic/camera";

/// One message on the bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMessage {
    /// Message id for client reconnection
    pub id: String,
    pub topic: String,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl TopicMessage {
    pub fn new(topic: &str, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            topic: topic.to_string(),
            payload,
            timestamp: Utc::now(),
        }
    }
}

/// Broadcast bus shared by publishers and SSE subscribers
#[derive(Clone)]
pub struct TopicBus {
    tx: broadcast::Sender<TopicMessage>,
}

impl TopicBus {
    /// Creates a new bus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of messages to buffer before slow subscribers lag
    ///
    /// # Examples
    ///
    /// ```
    /// use sseudam_common::events::TopicBus;
    ///
    /// let bus = TopicBus::new(100);
    /// assert_eq!(bus.subscriber_count(), 0);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future messages on every topic
    pub fn subscribe(&self) -> broadcast::Receiver<TopicMessage> {
        self.tx.subscribe()
    }

    /// Publish a message
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn publish(
        &self,
        topic: &str,
        payload: serde_json::Value,
    ) -> Result<usize, broadcast::error::SendError<TopicMessage>> {
        self.tx.send(TopicMessage::new(topic, payload))
    }

    /// Publish, ignoring if no subscribers are listening
    pub fn publish_lossy(&self, topic: &str, payload: serde_json::Value) {
        let _ = self.publish(topic, payload);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
