// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fetch::{FetchError, ImageReferenceError};
use crate::vision::ImageError;

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The submitted URL is not an absolute http(s) URL
    InvalidInput(String),
    /// The image could not be downloaded
    FetchFailure(String),
    /// The downloaded bytes are not a supported raster image
    DecodeFailure(String),
    /// The engine failed or returned unusable output
    EngineFailure(String),
    /// The engine has not been installed yet
    ServiceUnavailable,
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) => 422,
            ApiError::FetchFailure(_) => 400,
            ApiError::DecodeFailure(_) | ApiError::EngineFailure(_) => 500,
            ApiError::ServiceUnavailable => 503,
        }
    }

    /// Message reported to the caller
    pub fn detail(&self) -> String {
        self.to_string()
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            detail: self.detail(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidInput(msg) => write!(f, "Invalid image URL: {}", msg),
            ApiError::FetchFailure(msg) => write!(f, "Failed to download image: {}", msg),
            ApiError::DecodeFailure(msg) | ApiError::EngineFailure(msg) => {
                write!(f, "OCR processing failed: {}", msg)
            }
            ApiError::ServiceUnavailable => write!(f, "OCR engine not initialized"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl From<ImageReferenceError> for ApiError {
    fn from(err: ImageReferenceError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError::FetchFailure(err.to_string())
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        ApiError::DecodeFailure(err.to_string())
    }
}
