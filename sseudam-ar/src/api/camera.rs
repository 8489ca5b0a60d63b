//! Camera activation
//!
//! Tells the inspection app to open its camera, forwarding the caller's
//! credentials so the app can submit the resulting analysis on their behalf.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use sseudam_common::events::CAMERA_TOPIC;
use tracing::info;

use crate::AppState;

/// POST /api/camera/start
pub async fn start_camera(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let Some(token) = token else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Authorization token is required"})),
        );
    };

    state.event_bus.publish_lossy(
        CAMERA_TOPIC,
        json!({"action": "activate_camera", "token": token}),
    );
    info!(subscribers = state.event_bus.subscriber_count(), "Camera activation sent");

    (
        StatusCode::OK,
        Json(json!({"message": "Camera activation signal sent"})),
    )
}

pub fn camera_routes() -> Router<AppState> {
    Router::new().route("/api/camera/start", post(start_camera))
}
