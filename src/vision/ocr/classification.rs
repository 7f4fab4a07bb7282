// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text line orientation classifier
//!
//! Decides whether a cropped text line is upside down (rotated 180°).

use anyhow::{Context, Result};
use ndarray::Array4;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::{CLS_INPUT_WIDTH, LINE_INPUT_HEIGHT};

/// Orientation of a text line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrientation {
    Upright,
    Rotated180,
}

/// Classifier decision with the winning score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationResult {
    pub orientation: LineOrientation,
    pub score: f32,
}

/// Interpret the two-class output `[p_0deg, p_180deg]`
///
/// A line is only flipped when the 180° class wins with a score above
/// `threshold`.
pub fn decide_orientation(scores: [f32; 2], threshold: f32) -> OrientationResult {
    if scores[1] > scores[0] && scores[1] > threshold {
        OrientationResult {
            orientation: LineOrientation::Rotated180,
            score: scores[1],
        }
    } else {
        OrientationResult {
            orientation: LineOrientation::Upright,
            score: scores[0],
        }
    }
}

/// PaddleOCR angle classification model (0° / 180°)
#[derive(Clone)]
pub struct AngleClassifier {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Minimum 180° score before a line is flipped
    threshold: f32,
}

impl std::fmt::Debug for AngleClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AngleClassifier")
            .field("input_name", &self.input_name)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl AngleClassifier {
    /// Load the orientation classifier from a file
    pub async fn new<P: AsRef<Path>>(
        model_path: P,
        threshold: f32,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!(
                "OCR angle classification model not found: {}",
                model_path.display()
            );
        }

        info!(
            "Loading OCR angle classification model from {}",
            model_path.display()
        );

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!(
                    "Failed to load OCR angle classification model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        info!("✅ OCR angle classification model loaded successfully (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            threshold: threshold.clamp(0.0, 1.0),
        })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Classify a preprocessed line tensor of shape [1, 3, 48, 192]
    pub fn classify(&self, input: &Array4<f32>) -> Result<OrientationResult> {
        let shape = input.shape();
        if shape
            != [
                1,
                3,
                LINE_INPUT_HEIGHT as usize,
                CLS_INPUT_WIDTH as usize,
            ]
        {
            anyhow::bail!(
                "Invalid input shape: {:?}, expected [1, 3, {}, {}]",
                shape,
                LINE_INPUT_HEIGHT,
                CLS_INPUT_WIDTH
            );
        }

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Classification session lock poisoned"))?;

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Angle classification inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let values: Vec<f32> = output_tensor.iter().copied().collect();
        if values.len() != 2 {
            anyhow::bail!(
                "Unexpected classification output shape: {:?}",
                output_tensor.shape()
            );
        }

        let result = decide_orientation([values[0], values[1]], self.threshold);
        debug!(
            "Line orientation: {:?} ({:.3})",
            result.orientation, result.score
        );
        Ok(result)
    }
}
