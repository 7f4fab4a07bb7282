// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR request types

use serde::{Deserialize, Serialize};

/// Body of `POST /ocr/url`
///
/// The URL is kept as a raw string so that malformed values reach the
/// handler and are reported as invalid input rather than as a JSON error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrRequest {
    /// Absolute http(s) URL of the image
    pub image_url: String,
}

/// Body of `POST /ocr/batch`: image URLs in the order results are wanted
pub type BatchRequest = Vec<String>;
