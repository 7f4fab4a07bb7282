// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR response types

use serde::{Deserialize, Serialize};

use crate::vision::{Detection, ImageInfo};

/// Warning attached to results with no lines
pub const NO_TEXT_WARNING: &str = "No text detected";

/// One detected text line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognizedLine {
    /// Recognized text
    pub text: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f64,
    /// Four `[x, y]` vertices, clockwise from top-left
    pub bbox: [[i32; 2]; 4],
}

impl TryFrom<Detection> for RecognizedLine {
    type Error = String;

    /// Round the polygon to integer pixels and clamp the confidence
    ///
    /// Fails on NaN or infinite values.
    fn try_from(detection: Detection) -> Result<Self, Self::Error> {
        if !detection.confidence.is_finite() {
            return Err(format!(
                "engine returned non-finite confidence for '{}'",
                detection.text
            ));
        }
        if detection
            .polygon
            .iter()
            .flatten()
            .any(|coord| !coord.is_finite())
        {
            return Err(format!(
                "engine returned non-finite coordinates for '{}'",
                detection.text
            ));
        }

        let bbox = detection
            .polygon
            .map(|[x, y]| [x.round() as i32, y.round() as i32]);

        Ok(Self {
            text: detection.text,
            confidence: f64::from(detection.confidence.clamp(0.0, 1.0)),
            bbox,
        })
    }
}

/// Image and engine details reported with every result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultMetadata {
    /// `"WxH"`
    pub image_size: String,
    pub width: u32,
    pub height: u32,
    /// Upper-case format name (PNG, JPEG, ...)
    pub format: String,
    /// Engine identifier
    pub engine: String,
    pub processing_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ResultMetadata {
    pub fn new(info: &ImageInfo, engine: &str, processing_time_ms: u64) -> Self {
        Self {
            image_size: info.size_label(),
            width: info.width,
            height: info.height,
            format: info.format_name().to_string(),
            engine: engine.to_string(),
            processing_time_ms,
            warning: None,
        }
    }
}

/// Recognition result for one image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognitionResult {
    pub success: bool,
    /// Line texts joined with `\n`
    pub text: String,
    pub lines: Vec<String>,
    pub detailed_lines: Vec<RecognizedLine>,
    /// Mean line confidence, 0.0 with no lines
    pub avg_confidence: f64,
    pub total_lines: usize,
    pub metadata: ResultMetadata,
}

impl RecognitionResult {
    /// Build a result, deriving the aggregate fields from `detailed_lines`
    pub fn new(detailed_lines: Vec<RecognizedLine>, mut metadata: ResultMetadata) -> Self {
        let lines: Vec<String> = detailed_lines.iter().map(|l| l.text.clone()).collect();
        let total_lines = detailed_lines.len();
        let avg_confidence = if total_lines == 0 {
            0.0
        } else {
            detailed_lines.iter().map(|l| l.confidence).sum::<f64>() / total_lines as f64
        };

        if total_lines == 0 {
            metadata.warning = Some(NO_TEXT_WARNING.to_string());
        }

        Self {
            success: true,
            text: lines.join("\n"),
            lines,
            detailed_lines,
            avg_confidence,
            total_lines,
            metadata,
        }
    }
}
