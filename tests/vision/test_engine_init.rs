// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Startup engine initialization tests

use ocr_gateway::vision::ocr::{OcrEngineConfig, PaddleOcrModel};
use ocr_gateway::vision::{initialize_engine, EngineHandle, OcrEngine, RecognizeOptions};

// Model paths (downloaded by download scripts)
const OCR_MODEL_DIR: &str = "./models/paddleocr-onnx";

#[tokio::test]
async fn test_missing_models_leave_handle_empty() {
    let dir = tempfile::tempdir().unwrap();
    let handle = EngineHandle::new();

    let result = initialize_engine(&OcrEngineConfig::new(dir.path(), "en"), &handle).await;

    assert!(result.is_err());
    assert!(!handle.is_initialized().await);
}

#[tokio::test]
async fn test_unsupported_language_fails_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    let handle = EngineHandle::new();

    let err = initialize_engine(&OcrEngineConfig::new(dir.path(), "de"), &handle)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Invalid OCR engine configuration"));
    assert!(!handle.is_initialized().await);
}

#[tokio::test]
async fn test_detection_model_checked_first() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("en")).unwrap();
    let config = OcrEngineConfig {
        use_angle_cls: false,
        ..OcrEngineConfig::new(dir.path(), "en")
    };

    let err = PaddleOcrModel::load(&config).await.unwrap_err();
    assert!(err.to_string().contains("detection model not found"));
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_real_models_initialize() {
    let handle = EngineHandle::new();
    initialize_engine(&OcrEngineConfig::new(OCR_MODEL_DIR, "en"), &handle)
        .await
        .unwrap();

    let engine = handle.get().await.unwrap();
    assert_eq!(engine.name(), "paddleocr");

    let blank = image::DynamicImage::new_rgb8(200, 100);
    let detections = engine
        .recognize(&blank, RecognizeOptions::default())
        .unwrap();
    assert!(detections.is_empty());
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_real_models_without_classifier() {
    let config = OcrEngineConfig {
        use_angle_cls: false,
        ..OcrEngineConfig::new(OCR_MODEL_DIR, "en")
    };
    let model = PaddleOcrModel::load(&config).await.unwrap();
    assert!(!model.has_classifier());
}
