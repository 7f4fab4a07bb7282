// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR engine abstraction and the shared engine handle
//!
//! Request handlers never talk to a concrete model. They read an
//! [`EngineHandle`] from application state, which is empty until the startup
//! initializer installs an engine. Tests install stub engines the same way.

use image::DynamicImage;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::vision::ocr::{OcrEngineConfig, PaddleOcrModel};

/// Per-call options passed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognizeOptions {
    /// Run the text-line orientation classifier before recognition
    pub classify_angle: bool,
}

impl Default for RecognizeOptions {
    fn default() -> Self {
        Self {
            classify_angle: true,
        }
    }
}

/// One detection as reported by an engine, in original image pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Quadrilateral corners, clockwise from top-left
    pub polygon: [[f32; 2]; 4],
    /// Recognized text
    pub text: String,
    /// Recognition confidence, nominally in [0, 1]
    pub confidence: f32,
}

impl Detection {
    pub fn new(polygon: [[f32; 2]; 4], text: impl Into<String>, confidence: f32) -> Self {
        Self {
            polygon,
            text: text.into(),
            confidence,
        }
    }

    /// Build a detection from an axis-aligned rectangle
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32, text: &str, confidence: f32) -> Self {
        Self::new(
            [
                [x, y],
                [x + width, y],
                [x + width, y + height],
                [x, y + height],
            ],
            text,
            confidence,
        )
    }
}

/// Text detection and recognition engine
///
/// Implementations must be safe to share across requests. A call may block
/// for a long time; callers run it on the blocking thread pool.
#[cfg_attr(test, mockall::automock)]
pub trait OcrEngine: Send + Sync {
    /// Short engine identifier reported in response metadata
    fn name(&self) -> &'static str;

    /// Detect and recognize all text lines in `image`, in reading order
    fn recognize(
        &self,
        image: &DynamicImage,
        options: RecognizeOptions,
    ) -> anyhow::Result<Vec<Detection>>;
}

/// Process-wide slot for the initialized OCR engine
#[derive(Clone, Default)]
pub struct EngineHandle {
    engine: Arc<RwLock<Option<Arc<dyn OcrEngine>>>>,
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle").finish_non_exhaustive()
    }
}

impl EngineHandle {
    /// Create an empty handle (engine not yet initialized)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle that already holds `engine`
    pub fn with_engine(engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            engine: Arc::new(RwLock::new(Some(engine))),
        }
    }

    /// Install the engine, replacing any previous one
    pub async fn install(&self, engine: Arc<dyn OcrEngine>) {
        *self.engine.write().await = Some(engine);
    }

    /// Get the engine if initialized
    pub async fn get(&self) -> Option<Arc<dyn OcrEngine>> {
        self.engine.read().await.clone()
    }

    pub async fn is_initialized(&self) -> bool {
        self.engine.read().await.is_some()
    }
}

/// Load the PaddleOCR models and install them into `handle`
///
/// Called once at startup. Errors are fatal to the process; the caller decides
/// how to exit.
pub async fn initialize_engine(
    config: &OcrEngineConfig,
    handle: &EngineHandle,
) -> anyhow::Result<()> {
    info!(
        "Initializing PaddleOCR engine (lang: {}, models: {})",
        config.language,
        config.model_dir.display()
    );

    // Session creation reads and optimizes the ONNX graphs synchronously
    let load_config = config.clone();
    let runtime = tokio::runtime::Handle::current();
    let model = tokio::task::spawn_blocking(move || {
        runtime.block_on(PaddleOcrModel::load(&load_config))
    })
    .await
    .map_err(|e| anyhow::anyhow!("OCR engine loading task failed: {}", e))??;
    handle.install(Arc::new(model)).await;

    info!("✅ PaddleOCR engine initialized successfully");
    Ok(())
}
