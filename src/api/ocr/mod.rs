// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR API endpoint module
//!
//! Provides POST /ocr/url for a single image URL and POST /ocr/batch for a
//! list of URLs.

pub mod batch;
pub mod handler;
pub mod request;
pub mod response;

pub use batch::{ocr_batch_handler, BatchItem, BatchResponse};
pub use handler::{ocr_url_handler, recognize_url};
pub use request::{BatchRequest, OcrRequest};
pub use response::{RecognitionResult, RecognizedLine, ResultMetadata};
