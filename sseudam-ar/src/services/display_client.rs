//! Hardware display client
//!
//! The display device exposes one endpoint accepting `{"number": <n>}` and
//! shows the number on its panel.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::HardwareChannel;
use crate::error::DeliveryError;

const USER_AGENT: &str = concat!("sseudam-ar/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct DisplayRequest {
    number: i64,
}

/// HTTP client for the display device
#[derive(Clone)]
pub struct DisplayClient {
    http_client: reqwest::Client,
    url: String,
}

impl DisplayClient {
    pub fn new(url: impl Into<String>, timeout_ms: u64) -> Result<Self, DeliveryError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl HardwareChannel for DisplayClient {
    async fn send(&self, success_rate: i64) -> Result<(), DeliveryError> {
        let response = self
            .http_client
            .post(&self.url)
            .json(&DisplayRequest { number: success_rate })
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }

        debug!(success_rate, url = %self.url, "Display updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(DisplayRequest { number: 67 }).unwrap();
        assert_eq!(body, serde_json::json!({"number": 67}));
    }

    #[tokio::test]
    async fn test_unreachable_display_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let client = DisplayClient::new("http://127.0.0.1:9/display", 500).unwrap();
        let result = client.send(100).await;
        assert!(matches!(result, Err(DeliveryError::Transport(_))));
    }
}
