// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides:
//! - Image decoding and format detection
//! - The OCR engine abstraction shared by request handlers
//! - OCR (Optical Character Recognition) via PaddleOCR

pub mod engine;
pub mod image_utils;
pub mod ocr;

pub use engine::{initialize_engine, Detection, EngineHandle, OcrEngine, RecognizeOptions};
pub use image_utils::{decode_image_bytes, detect_format, ImageError, ImageInfo};
