//! Live channel backed by the in-process topic bus
//!
//! SSE clients subscribed via `GET /events` receive what is published here.

use async_trait::async_trait;
use sseudam_common::TopicBus;
use tracing::debug;

use super::LiveChannel;
use crate::error::DeliveryError;

#[async_trait]
impl LiveChannel for TopicBus {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), DeliveryError> {
        // No subscribers is a normal state for a live channel
        match TopicBus::publish(self, topic, payload) {
            Ok(count) => debug!(topic, subscribers = count, "Published to live channel"),
            Err(_) => debug!(topic, "No live subscribers"),
        }
        Ok(())
    }
}
