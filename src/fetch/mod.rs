// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image download module
//!
//! Validates image URLs and fetches their bytes over HTTP(S).

pub mod config;
pub mod fetcher;
pub mod reference;

pub use config::FetchConfig;
pub use fetcher::{FetchError, FetchedImage, ImageFetcher};
pub use reference::{ImageReference, ImageReferenceError};
