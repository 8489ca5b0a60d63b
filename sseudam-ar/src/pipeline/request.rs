//! Request body parsing
//!
//! Every field is optional at the serde level so a missing key and a wrong
//! type both surface as a malformed-input error instead of an extractor
//! rejection.

use serde::Deserialize;

use crate::error::AnalysisError;
use crate::scoring::{DetectedObject, ScoringError};

#[derive(Debug, Deserialize)]
struct AnalysisRequest {
    detection_results: Option<Vec<RawDetection>>,
}

/// One entry as submitted; unknown fields (bbox, ids) are ignored
#[derive(Debug, Deserialize)]
struct RawDetection {
    class: Option<String>,
    confidence: Option<f64>,
}

/// Parse `{"detection_results": [{"class": .., "confidence": ..}, ..]}`
pub fn parse_detections(body: &[u8]) -> Result<Vec<DetectedObject>, AnalysisError> {
    let request: AnalysisRequest = serde_json::from_slice(body)
        .map_err(|e| AnalysisError::MalformedInput(format!("invalid JSON body: {}", e)))?;

    let raw = request.detection_results.ok_or_else(|| {
        AnalysisError::MalformedInput("missing `detection_results`".to_string())
    })?;

    raw.into_iter()
        .enumerate()
        .map(|(index, d)| -> Result<DetectedObject, AnalysisError> {
            let class = d.class.ok_or(ScoringError::MissingClass { index })?;
            let confidence = d.confidence.ok_or(ScoringError::MissingConfidence { index })?;
            Ok(DetectedObject { class, confidence })
        })
        .collect()
}
