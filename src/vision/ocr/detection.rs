// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection model
//!
//! Runs the detection network and turns its probability map into text boxes.

use anyhow::{Context, Result};
use ndarray::{Array4, ArrayView2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Minimum number of text pixels in a connected region
const MIN_REGION_PIXELS: usize = 10;

/// Minimum side length of a box in input pixels
const MIN_BOX_SIDE: f32 = 3.0;

/// Boxes whose top edges differ by less than this are on the same row
const SAME_ROW_TOLERANCE: f32 = 10.0;

/// A detected text box in detection-input pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    /// X coordinate of top-left corner
    pub x: f32,
    /// Y coordinate of top-left corner
    pub y: f32,
    /// Width of the bounding box
    pub width: f32,
    /// Height of the bounding box
    pub height: f32,
    /// Mean text probability inside the region (0.0-1.0)
    pub confidence: f32,
}

impl TextBox {
    /// Check if this text box is valid (reasonable dimensions)
    pub fn is_valid(&self) -> bool {
        self.width >= MIN_BOX_SIDE && self.height >= MIN_BOX_SIDE && self.confidence > 0.0
    }

    /// Calculate area of the bounding box
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Corners clockwise from top-left
    pub fn corners(&self) -> [[f32; 2]; 4] {
        [
            [self.x, self.y],
            [self.x + self.width, self.y],
            [self.x + self.width, self.y + self.height],
            [self.x, self.y + self.height],
        ]
    }

    /// Expand the box outward by `area * ratio / perimeter` on every side
    ///
    /// The probability map marks a shrunk text kernel; this restores the full
    /// line extent.
    pub fn unclip(&self, ratio: f32) -> TextBox {
        let perimeter = 2.0 * (self.width + self.height);
        if perimeter <= 0.0 {
            return self.clone();
        }
        let distance = self.area() * ratio / perimeter;
        TextBox {
            x: self.x - distance,
            y: self.y - distance,
            width: self.width + 2.0 * distance,
            height: self.height + 2.0 * distance,
            confidence: self.confidence,
        }
    }
}

/// Parameters for turning a probability map into boxes
#[derive(Debug, Clone, Copy)]
pub struct DetectionParams {
    /// Pixel probability threshold
    pub threshold: f32,
    /// Minimum mean probability per box
    pub box_threshold: f32,
    /// Expansion ratio
    pub unclip_ratio: f32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            box_threshold: 0.5,
            unclip_ratio: 1.6,
        }
    }
}

/// PaddleOCR text detection model
///
/// Runs on CPU only.
#[derive(Clone)]
pub struct OcrDetectionModel {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Post-processing parameters
    params: DetectionParams,
}

impl std::fmt::Debug for OcrDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrDetectionModel")
            .field("input_name", &self.input_name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl OcrDetectionModel {
    /// Load the OCR detection model from a file
    ///
    /// # Errors
    /// Returns error if the model file is missing or ONNX Runtime rejects it.
    pub async fn new<P: AsRef<Path>>(
        model_path: P,
        params: DetectionParams,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR detection model not found: {}", model_path.display());
        }

        info!("Loading OCR detection model from {}", model_path.display());

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
                    "Failed to load OCR detection model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        debug!("Detection model loaded - input: {}", input_name);
        info!("✅ OCR detection model loaded successfully (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            params,
        })
    }

    pub fn params(&self) -> DetectionParams {
        self.params
    }

    /// Run text detection on a preprocessed image tensor
    ///
    /// `input` has shape [1, 3, H, W] (see `preprocess_for_detection`). Boxes
    /// are returned in input pixel space, in reading order.
    pub fn detect(&self, input: &Array4<f32>) -> Result<Vec<TextBox>> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 {
            anyhow::bail!("Invalid input shape: {:?}, expected [1, 3, H, W]", shape);
        }
        let (input_height, input_width) = (shape[2], shape[3]);

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Detection session lock poisoned"))?;

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        debug!("Detection output shape: {:?}", output_tensor.shape());

        // [1, 1, H, W] or [1, H, W] probability map
        let dims = output_tensor.shape().to_vec();
        let (map_height, map_width) = match dims.as_slice() {
            [1, 1, h, w] | [1, h, w] => (*h, *w),
            other => anyhow::bail!("Unexpected detection output shape: {:?}", other),
        };
        let prob_map = output_tensor
            .to_shape((map_height, map_width))
            .context("Failed to reshape probability map")?;

        let scale_x = input_width as f32 / map_width as f32;
        let scale_y = input_height as f32 / map_height as f32;

        let boxes = boxes_from_probability_map(prob_map.view(), &self.params)
            .into_iter()
            .map(|b| TextBox {
                x: b.x * scale_x,
                y: b.y * scale_y,
                width: b.width * scale_x,
                height: b.height * scale_y,
                confidence: b.confidence,
            })
            .collect::<Vec<_>>();

        debug!("Detected {} text regions", boxes.len());
        Ok(boxes)
    }
}

/// Extract text boxes from a [H, W] probability map
///
/// Connected components of pixels above `threshold` become boxes; boxes with a
/// low mean probability or a tiny footprint are dropped, the rest are
/// expanded by `unclip_ratio` and sorted into reading order.
pub fn boxes_from_probability_map(map: ArrayView2<f32>, params: &DetectionParams) -> Vec<TextBox> {
    let (height, width) = map.dim();
    let mut visited = vec![false; height * width];
    let mut text_boxes = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if visited[y * width + x] || map[[y, x]] < params.threshold {
                continue;
            }

            let region = flood_fill(&map, &mut visited, x, y, params.threshold);
            if region.count < MIN_REGION_PIXELS {
                continue;
            }

            let candidate = TextBox {
                x: region.min_x as f32,
                y: region.min_y as f32,
                width: (region.max_x - region.min_x + 1) as f32,
                height: (region.max_y - region.min_y + 1) as f32,
                confidence: region.sum / region.count as f32,
            };

            if candidate.confidence < params.box_threshold || !candidate.is_valid() {
                continue;
            }

            text_boxes.push(candidate.unclip(params.unclip_ratio));
        }
    }

    sort_reading_order(&mut text_boxes);
    text_boxes
}

/// Sort top-to-bottom, then left-to-right within a row
pub fn sort_reading_order(boxes: &mut [TextBox]) {
    boxes.sort_by(|a, b| {
        a.y.partial_cmp(&b.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    // Boxes on the same visual row may be out of x order after the y sort
    for i in 0..boxes.len().saturating_sub(1) {
        for j in (0..=i).rev() {
            if (boxes[j + 1].y - boxes[j].y).abs() < SAME_ROW_TOLERANCE
                && boxes[j + 1].x < boxes[j].x
            {
                boxes.swap(j, j + 1);
            } else {
                break;
            }
        }
    }
}

struct Region {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
    count: usize,
    sum: f32,
}

/// 4-connected flood fill over pixels at or above `threshold`
fn flood_fill(
    map: &ArrayView2<f32>,
    visited: &mut [bool],
    start_x: usize,
    start_y: usize,
    threshold: f32,
) -> Region {
    let (height, width) = map.dim();
    let mut stack = vec![(start_x, start_y)];
    let mut region = Region {
        min_x: start_x,
        max_x: start_x,
        min_y: start_y,
        max_y: start_y,
        count: 0,
        sum: 0.0,
    };

    while let Some((x, y)) = stack.pop() {
        let idx = y * width + x;
        if visited[idx] {
            continue;
        }
        let prob = map[[y, x]];
        if prob < threshold {
            continue;
        }

        visited[idx] = true;
        region.count += 1;
        region.sum += prob;
        region.min_x = region.min_x.min(x);
        region.max_x = region.max_x.max(x);
        region.min_y = region.min_y.min(y);
        region.max_y = region.max_y.max(y);

        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < width {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < height {
            stack.push((x, y + 1));
        }
    }

    region
}
