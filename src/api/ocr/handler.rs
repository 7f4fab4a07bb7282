// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR endpoint handler

use axum::{extract::State, Json};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::request::OcrRequest;
use super::response::{RecognitionResult, RecognizedLine, ResultMetadata};
use crate::api::errors::ApiError;
use crate::api::extract::ApiJson;
use crate::api::http_server::AppState;
use crate::fetch::ImageReference;
use crate::vision::{decode_image_bytes, OcrEngine, RecognizeOptions};

/// POST /ocr/url - Extract text from an image hosted at a URL
///
/// # Request
/// - `image_url`: Absolute http(s) URL of the image (required)
///
/// # Response
/// `RecognitionResult` with the recognized lines in reading order.
///
/// # Errors
/// - 422 Unprocessable Entity: the body is not `{"image_url": string}`, or the
///   URL is malformed or not http(s)
/// - 400 Bad Request: the image could not be downloaded
/// - 500 Internal Server Error: decoding or recognition failed
/// - 503 Service Unavailable: the OCR engine is still loading
pub async fn ocr_url_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<OcrRequest>,
) -> Result<Json<RecognitionResult>, ApiError> {
    recognize_url(&state, &request.image_url).await.map(Json)
}

/// Validate, download, decode and recognize one image URL
///
/// Shared by the single-image and batch endpoints.
pub async fn recognize_url(state: &AppState, raw_url: &str) -> Result<RecognitionResult, ApiError> {
    // 1. Validate before touching the network
    let reference = ImageReference::parse(raw_url).map_err(|e| {
        warn!("Rejected image URL {:?}: {}", raw_url, e);
        ApiError::from(e)
    })?;

    // 2. Engine must be installed
    let engine = state.engine.get().await.ok_or_else(|| {
        warn!("OCR request received before engine initialization");
        ApiError::ServiceUnavailable
    })?;

    info!("OCR request for {}", reference);

    // 3. Download
    let fetched = state.fetcher.fetch(&reference).await.map_err(|e| {
        warn!("Image download failed for {}: {}", reference, e);
        ApiError::from(e)
    })?;

    // 4-7. Decode and recognize
    let result = recognize_image_bytes(engine, &fetched.bytes).await;
    if let Err(ApiError::DecodeFailure(_)) = &result {
        warn!(
            "Undecodable body from {} (content-type: {})",
            fetched.final_url,
            fetched.content_type.as_deref().unwrap_or("none")
        );
    }
    result
}

/// Decode an encoded image and run the engine on it
pub async fn recognize_image_bytes(
    engine: Arc<dyn OcrEngine>,
    bytes: &[u8],
) -> Result<RecognitionResult, ApiError> {
    let start = Instant::now();

    let (image, image_info) = decode_image_bytes(bytes).map_err(|e| {
        warn!("Failed to decode image: {}", e);
        ApiError::from(e)
    })?;

    debug!(
        "Decoded image: {}x{} {}, {} bytes",
        image_info.width,
        image_info.height,
        image_info.format_name(),
        image_info.size_bytes
    );

    let engine_name = engine.name();
    let options = RecognizeOptions {
        classify_angle: true,
    };

    let detections = tokio::task::spawn_blocking(move || engine.recognize(&image, options))
        .await
        .map_err(|e| {
            error!("OCR task panicked: {}", e);
            ApiError::EngineFailure(e.to_string())
        })?
        .map_err(|e| {
            error!("OCR processing failed: {:#}", e);
            ApiError::EngineFailure(format!("{:#}", e))
        })?;

    let detailed_lines = detections
        .into_iter()
        .map(RecognizedLine::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            error!("Invalid engine output: {}", e);
            ApiError::EngineFailure(e)
        })?;

    let metadata = ResultMetadata::new(
        &image_info,
        engine_name,
        start.elapsed().as_millis() as u64,
    );
    let result = RecognitionResult::new(detailed_lines, metadata);

    info!(
        "OCR complete: {} lines, {:.2} confidence, {}ms",
        result.total_lines, result.avg_confidence, result.metadata.processing_time_ms
    );

    Ok(result)
}
