// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod fetch;
pub mod version;
pub mod vision;

pub use api::{create_router, AppState, ApiError, RecognitionResult, RecognizedLine};
pub use config::{ConfigError, ServiceConfig};
pub use fetch::{FetchConfig, ImageFetcher, ImageReference};
pub use vision::{initialize_engine, Detection, EngineHandle, OcrEngine, RecognizeOptions};
