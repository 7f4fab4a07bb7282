// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition model
//!
//! Recognizes the text content of a single cropped text line.

use anyhow::{Context, Result};
use ndarray::{Array4, ArrayView2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::LINE_INPUT_HEIGHT;

/// Placeholder stored at the CTC blank index; never emitted
const CTC_BLANK: char = '\u{0}';

/// Recognized text with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    /// The recognized text content
    pub text: String,
    /// Mean probability of the emitted characters (0.0-1.0)
    pub confidence: f32,
}

impl RecognizedText {
    pub fn new(text: String, confidence: f32) -> Self {
        Self { text, confidence }
    }

    /// Check if the text is empty or whitespace only
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// PaddleOCR text recognition model
///
/// Runs on CPU only.
#[derive(Clone)]
pub struct OcrRecognitionModel {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Character dictionary for CTC decoding, blank at index 0
    dictionary: Arc<Vec<char>>,
    /// Model input name
    input_name: String,
}

impl std::fmt::Debug for OcrRecognitionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrRecognitionModel")
            .field("dictionary_size", &self.dictionary.len())
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OcrRecognitionModel {
    /// Load the OCR recognition model and its character dictionary
    ///
    /// # Errors
    /// Returns error if either file is missing or ONNX Runtime rejects the model.
    pub async fn new<P: AsRef<Path>>(
        model_path: P,
        dict_path: P,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        let dict_path = dict_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR recognition model not found: {}", model_path.display());
        }
        if !dict_path.exists() {
            anyhow::bail!(
                "OCR character dictionary not found: {}",
                dict_path.display()
            );
        }

        info!(
            "Loading OCR recognition model from {}",
            model_path.display()
        );

        let dictionary = load_dictionary(dict_path)?;
        info!(
            "Loaded character dictionary with {} characters",
            dictionary.len() - 1
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
                    "Failed to load OCR recognition model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        if let Some(input) = session.inputs.first() {
            debug!("Recognition model expected input: {:?}", input.input_type);
        }

        info!("✅ OCR recognition model loaded successfully (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            dictionary: Arc::new(dictionary),
            input_name,
        })
    }

    /// Recognize text from a preprocessed line tensor of shape [1, 3, 48, W]
    pub fn recognize(&self, input: &Array4<f32>) -> Result<RecognizedText> {
        let shape = input.shape();
        if shape[0] != 1
            || shape[1] != 3
            || shape[2] != LINE_INPUT_HEIGHT as usize
            || shape[3] < 4
        {
            anyhow::bail!(
                "Invalid input shape: {:?}, expected [1, 3, {}, W>=4]",
                shape,
                LINE_INPUT_HEIGHT
            );
        }

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Recognition session lock poisoned"))?;

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Recognition inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        // [1, seq_len, num_classes] or [seq_len, num_classes]
        let dims = output_tensor.shape().to_vec();
        let (seq_len, num_classes) = match dims.as_slice() {
            [1, t, c] | [t, c] => (*t, *c),
            other => anyhow::bail!("Unexpected recognition output shape: {:?}", other),
        };
        let probs = output_tensor
            .to_shape((seq_len, num_classes))
            .context("Failed to reshape recognition output")?;

        Ok(ctc_greedy_decode(probs.view(), &self.dictionary))
    }
}

/// Load a character dictionary, one character per line
///
/// Index 0 is reserved for the CTC blank and a trailing space class is
/// appended, matching the PaddleOCR label layout.
pub fn load_dictionary<P: AsRef<Path>>(path: P) -> Result<Vec<char>> {
    let file = File::open(path.as_ref())
        .with_context(|| format!("Failed to open dictionary: {}", path.as_ref().display()))?;

    let reader = BufReader::new(file);
    let mut dictionary = vec![CTC_BLANK];

    for line in reader.lines() {
        let line = line.context("Failed to read dictionary line")?;
        let line = line.trim_end_matches('\r');
        if let Some(ch) = line.chars().next() {
            dictionary.push(ch);
        }
    }

    if dictionary.len() == 1 {
        anyhow::bail!("Dictionary is empty: {}", path.as_ref().display());
    }

    dictionary.push(' ');
    Ok(dictionary)
}

/// CTC greedy (best path) decoding
///
/// Takes the arg-max class per timestep, collapses repeats and removes blanks.
/// Confidence is the mean probability of the emitted characters.
pub fn ctc_greedy_decode(probs: ArrayView2<f32>, dictionary: &[char]) -> RecognizedText {
    let mut text = String::new();
    let mut total_confidence = 0.0f32;
    let mut emitted = 0usize;
    let mut prev_index: Option<usize> = None;

    for row in probs.rows() {
        let (max_index, max_prob) = row
            .iter()
            .copied()
            .enumerate()
            .fold((0usize, f32::NEG_INFINITY), |best, (i, p)| {
                if p > best.1 {
                    (i, p)
                } else {
                    best
                }
            });

        if max_index != 0 && Some(max_index) != prev_index {
            if let Some(&ch) = dictionary.get(max_index) {
                text.push(ch);
                total_confidence += max_prob;
                emitted += 1;
            }
        }

        prev_index = if max_index == 0 { None } else { Some(max_index) };
    }

    let confidence = if emitted == 0 {
        0.0
    } else {
        (total_confidence / emitted as f32).clamp(0.0, 1.0)
    };

    RecognizedText::new(text.trim().to_string(), confidence)
}
