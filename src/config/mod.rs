// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Every setting can be given as a command line flag or through the matching
//! `OCR_*` environment variable. A `.env` file is loaded before parsing.

use clap::{ArgAction, Parser};
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

use crate::fetch::config::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_IMAGE_BYTES};
use crate::fetch::FetchConfig;
use crate::vision::ocr::{OcrEngineConfig, DEFAULT_MODEL_DIR, SUPPORTED_LANGUAGES};

/// Default port the service listens on
pub const DEFAULT_PORT: u16 = 7001;

/// Default number of images processed concurrently in a batch
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid listen address {0}")]
    InvalidAddress(String),

    #[error("Unsupported language '{0}' (supported: en, zh, ja, ko)")]
    UnsupportedLanguage(String),

    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f32 },

    #[error("{0} must be at least 1")]
    Zero(&'static str),
}

/// OCR gateway server
#[derive(Parser, Debug, Clone)]
#[command(name = "ocr-gateway")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Image URL to text recognition service", long_about = None)]
pub struct ServiceConfig {
    /// Interface to bind
    #[arg(long, env = "OCR_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// TCP port to listen on
    #[arg(long, env = "OCR_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Recognition language (en, zh, ja, ko)
    #[arg(long, env = "OCR_LANG", default_value = "en")]
    pub lang: String,

    /// Directory holding the PaddleOCR ONNX models
    #[arg(long, env = "OCR_MODEL_DIR", default_value = DEFAULT_MODEL_DIR)]
    pub model_dir: PathBuf,

    /// Correct upside-down text lines before recognition
    #[arg(long, env = "OCR_USE_ANGLE_CLS", default_value_t = true, action = ArgAction::Set)]
    pub use_angle_cls: bool,

    /// Timeout for each image download in seconds
    #[arg(long, env = "OCR_FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub fetch_timeout_secs: u64,

    /// Largest image body accepted, in bytes
    #[arg(long, env = "OCR_MAX_IMAGE_BYTES", default_value_t = DEFAULT_MAX_IMAGE_BYTES)]
    pub max_image_bytes: usize,

    /// Images processed concurrently per batch request
    #[arg(long, env = "OCR_BATCH_CONCURRENCY", default_value_t = DEFAULT_BATCH_CONCURRENCY)]
    pub batch_concurrency: usize,

    /// Pixel threshold on the detection probability map
    #[arg(long, env = "OCR_DET_THRESHOLD", default_value_t = 0.3)]
    pub det_threshold: f32,

    /// Minimum mean probability for a detected text box
    #[arg(long, env = "OCR_BOX_THRESHOLD", default_value_t = 0.5)]
    pub box_threshold: f32,

    /// Minimum recognition confidence for a line to be returned
    #[arg(long, env = "OCR_REC_SCORE_THRESHOLD", default_value_t = 0.5)]
    pub rec_score_threshold: f32,

    /// ONNX Runtime intra-op threads per model
    #[arg(long, env = "OCR_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Ignore HTTP(S)_PROXY variables when downloading images
    #[arg(long, env = "OCR_NO_PROXY", default_value_t = false, action = ArgAction::Set)]
    pub no_proxy: bool,
}

impl ServiceConfig {
    /// Check values clap cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;

        let lang = self.lang.to_lowercase();
        if !SUPPORTED_LANGUAGES.contains(&lang.as_str()) {
            return Err(ConfigError::UnsupportedLanguage(self.lang.clone()));
        }

        for (name, value) in [
            ("det_threshold", self.det_threshold),
            ("box_threshold", self.box_threshold),
            ("rec_score_threshold", self.rec_score_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }

        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Zero("fetch_timeout_secs"));
        }
        if self.max_image_bytes == 0 {
            return Err(ConfigError::Zero("max_image_bytes"));
        }
        if self.batch_concurrency == 0 {
            return Err(ConfigError::Zero("batch_concurrency"));
        }
        if self.intra_threads == 0 {
            return Err(ConfigError::Zero("intra_threads"));
        }

        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }

    /// Normalized recognition language
    pub fn language(&self) -> String {
        self.lang.to_lowercase()
    }

    pub fn engine_config(&self) -> OcrEngineConfig {
        OcrEngineConfig {
            use_angle_cls: self.use_angle_cls,
            det_threshold: self.det_threshold,
            box_threshold: self.box_threshold,
            rec_score_threshold: self.rec_score_threshold,
            intra_threads: self.intra_threads,
            ..OcrEngineConfig::new(&self.model_dir, &self.lang)
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout_secs: self.fetch_timeout_secs,
            max_image_bytes: self.max_image_bytes,
            use_env_proxy: !self.no_proxy,
            ..FetchConfig::default()
        }
    }
}
