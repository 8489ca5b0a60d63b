//! Outcome delivery to the live channel and the display device
//!
//! Each delivery runs in its own task with its own timeout. A failure or
//! panic in one never affects the other, and neither is awaited by the
//! HTTP response.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::DeliveryError;
use crate::services::{HardwareChannel, LiveChannel};
use sseudam_common::events::AI_RESULTS_TOPIC;

/// Handles to the spawned deliveries
///
/// Dropping them detaches the tasks. Tests await them to observe outcomes.
pub struct DeliveryHandles {
    pub live: JoinHandle<Result<(), DeliveryError>>,
    /// `None` when no display device is configured
    pub hardware: Option<JoinHandle<Result<(), DeliveryError>>>,
}

#[derive(Clone)]
pub struct ResultBroadcaster {
    live: Arc<dyn LiveChannel>,
    hardware: Option<Arc<dyn HardwareChannel>>,
    timeout: Duration,
}

impl ResultBroadcaster {
    pub fn new(
        live: Arc<dyn LiveChannel>,
        hardware: Option<Arc<dyn HardwareChannel>>,
        timeout: Duration,
    ) -> Self {
        Self {
            live,
            hardware,
            timeout,
        }
    }

    /// Spawn both deliveries and return immediately
    pub fn dispatch(&self, payload: serde_json::Value, success_rate: i64) -> DeliveryHandles {
        let timeout = self.timeout;

        let live = Arc::clone(&self.live);
        let live = tokio::spawn(async move {
            let result = with_timeout(timeout, live.publish(AI_RESULTS_TOPIC, payload)).await;
            match &result {
                Ok(()) => debug!(topic = AI_RESULTS_TOPIC, "Live delivery complete"),
                Err(e) => warn!(topic = AI_RESULTS_TOPIC, "Live delivery failed: {}", e),
            }
            result
        });

        let hardware = self.hardware.as_ref().map(|channel| {
            let channel = Arc::clone(channel);
            tokio::spawn(async move {
                let result = with_timeout(timeout, channel.send(success_rate)).await;
                match &result {
                    Ok(()) => debug!(success_rate, "Hardware delivery complete"),
                    Err(e) => warn!(success_rate, "Hardware delivery failed: {}", e),
                }
                result
            })
        });

        DeliveryHandles { live, hardware }
    }
}

async fn with_timeout<F>(timeout: Duration, delivery: F) -> Result<(), DeliveryError>
where
    F: std::future::Future<Output = Result<(), DeliveryError>>,
{
    tokio::time::timeout(timeout, delivery)
        .await
        .unwrap_or(Err(DeliveryError::Timeout(timeout.as_millis() as u64)))
}
