// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Liveness and readiness endpoint tests

use super::support::{get_json, state_with, FixedEngine};
use axum::http::StatusCode;
use ocr_gateway::{version, vision::EngineHandle};
use std::sync::Arc;

#[tokio::test]
async fn test_root_reports_service_identity() {
    let (status, body) = get_json(state_with(EngineHandle::new()), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], version::SERVICE_NAME);
    assert_eq!(body["status"], "running");
    assert_eq!(body["version"], version::VERSION_NUMBER);
}

#[tokio::test]
async fn test_health_before_engine_installed() {
    let (status, body) = get_json(state_with(EngineHandle::new()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ocr_engine"], "not_initialized");
    assert_eq!(body["language"], "en");
}

#[tokio::test]
async fn test_health_after_engine_installed() {
    let engine = EngineHandle::new();
    let state = state_with(engine.clone());

    let (_, before) = get_json(state.clone(), "/health").await;
    assert_eq!(before["ocr_engine"], "not_initialized");

    engine
        .install(Arc::new(FixedEngine { detections: vec![] }))
        .await;

    let (status, after) = get_json(state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["ocr_engine"], "initialized");
}

#[tokio::test]
async fn test_health_is_repeatable() {
    let state = state_with(EngineHandle::new());
    let (_, first) = get_json(state.clone(), "/health").await;
    let (_, second) = get_json(state, "/health").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _) = get_json(state_with(EngineHandle::new()), "/v1/ocr").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
