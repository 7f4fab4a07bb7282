// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR engine configuration and model file layout

use std::path::{Path, PathBuf};

/// Languages with a recognition model and dictionary
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "zh", "ja", "ko"];

/// Default model directory
pub const DEFAULT_MODEL_DIR: &str = "./models/paddleocr-onnx";

const DET_MODEL_FILE: &str = "det_model.onnx";
const CLS_MODEL_FILE: &str = "cls_model.onnx";
const REC_MODEL_FILE: &str = "rec_model.onnx";
const DICT_FILE: &str = "dict.txt";

/// Configuration for loading and running the PaddleOCR models
///
/// Expected layout under `model_dir`:
/// - `det_model.onnx` (text detection, shared by all languages)
/// - `cls_model.onnx` (text line orientation, shared by all languages)
/// - `<language>/rec_model.onnx` (text recognition)
/// - `<language>/dict.txt` (one character per line)
#[derive(Debug, Clone)]
pub struct OcrEngineConfig {
    /// Root directory holding the ONNX models
    pub model_dir: PathBuf,
    /// Recognition language (en, zh, ja, ko)
    pub language: String,
    /// Load and use the orientation classifier (default: true)
    pub use_angle_cls: bool,
    /// Square input size for the detection model (default: 640)
    pub det_input_size: u32,
    /// Probability map threshold for text pixels (default: 0.3)
    pub det_threshold: f32,
    /// Minimum mean probability for a detected box (default: 0.5)
    pub box_threshold: f32,
    /// Box expansion ratio applied after detection (default: 1.6)
    pub unclip_ratio: f32,
    /// Score above which a line is treated as upside down (default: 0.9)
    pub cls_threshold: f32,
    /// Minimum recognition confidence for a line to be kept (default: 0.5)
    pub rec_score_threshold: f32,
    /// ONNX Runtime intra-op threads per session (default: 4)
    pub intra_threads: usize,
}

impl OcrEngineConfig {
    /// Configuration with default thresholds for `language` under `model_dir`
    pub fn new(model_dir: impl AsRef<Path>, language: &str) -> Self {
        Self {
            model_dir: model_dir.as_ref().to_path_buf(),
            language: language.to_lowercase(),
            ..Self::default()
        }
    }

    pub fn det_model_path(&self) -> PathBuf {
        self.model_dir.join(DET_MODEL_FILE)
    }

    pub fn cls_model_path(&self) -> PathBuf {
        self.model_dir.join(CLS_MODEL_FILE)
    }

    pub fn rec_model_path(&self) -> PathBuf {
        self.model_dir.join(&self.language).join(REC_MODEL_FILE)
    }

    pub fn dict_path(&self) -> PathBuf {
        self.model_dir.join(&self.language).join(DICT_FILE)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if !SUPPORTED_LANGUAGES.contains(&self.language.as_str()) {
            return Err(format!(
                "unsupported language '{}', supported: {:?}",
                self.language, SUPPORTED_LANGUAGES
            ));
        }

        for (name, value) in [
            ("det_threshold", self.det_threshold),
            ("box_threshold", self.box_threshold),
            ("cls_threshold", self.cls_threshold),
            ("rec_score_threshold", self.rec_score_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be within [0, 1], got {}", name, value));
            }
        }

        if self.det_input_size < 32 || self.det_input_size % 32 != 0 {
            return Err(format!(
                "det_input_size must be a positive multiple of 32, got {}",
                self.det_input_size
            ));
        }
        if self.unclip_ratio <= 0.0 {
            return Err("unclip_ratio must be positive".to_string());
        }
        if self.intra_threads == 0 {
            return Err("intra_threads must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for OcrEngineConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            language: "en".to_string(),
            use_angle_cls: true,
            det_input_size: 640,
            det_threshold: 0.3,
            box_threshold: 0.5,
            unclip_ratio: 1.6,
            cls_threshold: 0.9,
            rec_score_threshold: 0.5,
            intra_threads: 4,
        }
    }
}
