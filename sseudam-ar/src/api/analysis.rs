//! Analysis result submission
//!
//! The recognition service posts detected objects here with the user's
//! bearer token. The body is taken as raw bytes so every parse failure maps
//! to the same malformed-input response.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    routing::post,
    Json, Router,
};

use crate::error::{AnalysisError, AnalysisResult, AuthFailure};
use crate::pipeline::OutcomePayload;
use crate::AppState;

/// POST /analysis-result
///
/// Once the request is authenticated and parsed, the submission runs to
/// completion even if the client disconnects. Deliveries to the live channel
/// and the display run detached; the response returns as soon as the ledger
/// is updated.
pub async fn submit_analysis(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AnalysisResult<Json<OutcomePayload>> {
    let authorization = match headers.get(AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AnalysisError::Auth(AuthFailure::MalformedHeader))?,
        ),
        None => None,
    };

    let processed = state.pipeline.handle(authorization, &body).await?;
    Ok(Json(processed.payload))
}

/// Build analysis routes
///
/// `/api/ai/analysis-result` is the path the recognition service calls.
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/analysis-result", post(submit_analysis))
        .route("/api/ai/analysis-result", post(submit_analysis))
}
