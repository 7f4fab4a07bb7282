// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request body extractors

use axum::extract::FromRequest;

use super::errors::ApiError;

/// `axum::Json` whose rejections are reported as [`ApiError`]
///
/// Keeps malformed bodies on the same `{"detail"}` error shape as every other
/// failure.
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
