// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for image downloads
//!
//! Defines timeouts, redirect limits and body size limits for the fetcher.

/// Default timeout for a single image download in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default maximum image body size (20MB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Default maximum number of redirects followed
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Configuration for image fetching
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout for the whole download in seconds (default: 30)
    pub timeout_secs: u64,
    /// Maximum accepted body size in bytes (default: 20MB)
    pub max_image_bytes: usize,
    /// Maximum redirects followed before giving up (default: 10)
    pub max_redirects: usize,
    /// User agent sent with every request
    pub user_agent: String,
    /// Honour HTTP(S)_PROXY environment variables (default: true)
    pub use_env_proxy: bool,
}

impl FetchConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be at least 1".to_string());
        }
        if self.max_image_bytes == 0 {
            return Err("max_image_bytes must be at least 1".to_string());
        }
        if self.user_agent.trim().is_empty() {
            return Err("user_agent must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: format!("ocr-gateway/{}", crate::version::VERSION_NUMBER),
            use_env_proxy: true,
        }
    }
}
