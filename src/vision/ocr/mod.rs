// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR integration for text extraction from images
//!
//! This module provides CPU-based OCR using PaddleOCR ONNX models.
//!
//! Components:
//! - `detection` - Text region detection (DB post-processing)
//! - `classification` - 0°/180° text line orientation
//! - `recognition` - Text recognition from detected regions (CTC)
//! - `preprocessing` - Image preprocessing for models
//! - `model` - Combined OCR pipeline

pub mod classification;
pub mod config;
pub mod detection;
pub mod model;
pub mod preprocessing;
pub mod recognition;

pub use classification::{AngleClassifier, LineOrientation};
pub use config::{OcrEngineConfig, DEFAULT_MODEL_DIR, SUPPORTED_LANGUAGES};
pub use detection::{DetectionParams, OcrDetectionModel, TextBox};
pub use model::PaddleOcrModel;
pub use recognition::{OcrRecognitionModel, RecognizedText};
