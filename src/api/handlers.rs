// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Liveness and readiness handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::http_server::AppState;
use crate::version;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootResponse {
    pub service: String,
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    /// `initialized` or `not_initialized`
    pub ocr_engine: String,
    pub language: String,
}

/// GET / - service identity, independent of the engine
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        service: version::SERVICE_NAME.to_string(),
        status: "running".to_string(),
        version: version::VERSION_NUMBER.to_string(),
    })
}

/// GET /health - engine readiness
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let ocr_engine = if state.engine.is_initialized().await {
        "initialized"
    } else {
        "not_initialized"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        ocr_engine: ocr_engine.to_string(),
        language: state.language.clone(),
    })
}
