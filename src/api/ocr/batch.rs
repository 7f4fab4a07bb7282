// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Batch OCR endpoint

use axum::{extract::State, Json};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::handler::recognize_url;
use super::request::BatchRequest;
use super::response::RecognitionResult;
use crate::api::errors::ApiError;
use crate::api::extract::ApiJson;
use crate::api::http_server::AppState;

/// Outcome for one URL of a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchItem {
    pub url: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<RecognitionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    pub fn succeeded(url: String, data: RecognitionResult) -> Self {
        Self {
            url,
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(url: String, error: String) -> Self {
        Self {
            url,
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchResponse {
    pub total: usize,
    pub processed: usize,
    pub results: Vec<BatchItem>,
}

impl BatchResponse {
    pub fn new(results: Vec<BatchItem>) -> Self {
        Self {
            total: results.len(),
            processed: results.len(),
            results,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|item| item.success).count()
    }
}

/// POST /ocr/batch - Extract text from several image URLs
///
/// Each URL goes through the same pipeline as `/ocr/url`. Failures are
/// reported per item and never fail the request. Results keep input order.
/// A body that is not a JSON array of strings is rejected with 422.
pub async fn ocr_batch_handler(
    State(state): State<AppState>,
    ApiJson(urls): ApiJson<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    Ok(Json(process_batch(&state, urls).await))
}

pub async fn process_batch(state: &AppState, urls: Vec<String>) -> BatchResponse {
    info!(
        "Batch OCR request: {} images, concurrency {}",
        urls.len(),
        state.batch_concurrency
    );

    let results: Vec<BatchItem> = stream::iter(urls)
        .map(|url| {
            let state = state.clone();
            async move {
                match recognize_url(&state, &url).await {
                    Ok(data) => BatchItem::succeeded(url, data),
                    Err(e) => BatchItem::failed(url, e.detail()),
                }
            }
        })
        .buffered(state.batch_concurrency.max(1))
        .collect()
        .await;

    let response = BatchResponse::new(results);
    info!(
        "Batch OCR complete: {}/{} succeeded",
        response.succeeded(),
        response.total
    );
    response
}
