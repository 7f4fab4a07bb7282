// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, root_handler};
use super::ocr::{ocr_batch_handler, ocr_url_handler};
use crate::config::{ServiceConfig, DEFAULT_BATCH_CONCURRENCY};
use crate::fetch::{FetchError, ImageFetcher};
use crate::vision::EngineHandle;

/// Shared state cloned into every handler
#[derive(Clone, Debug)]
pub struct AppState {
    /// Slot for the OCR engine, empty until startup loading finishes
    pub engine: EngineHandle,
    pub fetcher: Arc<ImageFetcher>,
    /// Recognition language reported by the health endpoint
    pub language: String,
    /// Images processed concurrently per batch request
    pub batch_concurrency: usize,
}

impl AppState {
    pub fn new(engine: EngineHandle, fetcher: ImageFetcher, language: impl Into<String>) -> Self {
        Self {
            engine,
            fetcher: Arc::new(fetcher),
            language: language.into(),
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }

    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self
    }

    /// Build state from service configuration with an empty engine slot
    pub fn from_config(config: &ServiceConfig, engine: EngineHandle) -> Result<Self, FetchError> {
        let fetcher = ImageFetcher::new(&config.fetch_config())?;
        Ok(Self::new(engine, fetcher, config.language())
            .with_batch_concurrency(config.batch_concurrency))
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Liveness and readiness
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        // Recognition
        .route("/ocr/url", post(ocr_url_handler))
        .route("/ocr/batch", post(ocr_batch_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve the router on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("OCR gateway listening on {}", addr);
    }

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
