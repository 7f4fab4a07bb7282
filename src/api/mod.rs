// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod http_server;
pub mod ocr;

pub use errors::{ApiError, ErrorResponse};
pub use extract::ApiJson;
pub use handlers::{HealthResponse, RootResponse};
pub use http_server::{create_router, serve, AppState};
pub use ocr::{BatchResponse, OcrRequest, RecognitionResult, RecognizedLine};
