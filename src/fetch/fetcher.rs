// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP image fetching with timeouts and size limits
//!
//! Downloads the raw bytes behind an [`ImageReference`]. Redirects are followed
//! automatically; any non-2xx final status is an error.

use bytes::{Bytes, BytesMut};
use reqwest::{header, Client};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use super::config::FetchConfig;
use super::reference::ImageReference;

/// Image fetch error types
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request timed out
    #[error("timed out fetching {0}")]
    Timeout(String),

    /// Connection, TLS, redirect or body read failure
    #[error("HTTP error: {0}")]
    Transport(String),

    /// Final response was not a success status
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Body exceeded the configured size limit
    #[error("image exceeds maximum size of {limit} bytes")]
    TooLarge { limit: usize },

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(url.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Downloaded image body
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// URL after following redirects
    pub final_url: Url,
    /// Content-Type header, if the server sent one
    pub content_type: Option<String>,
    /// Raw body bytes
    pub bytes: Bytes,
}

/// Image downloader shared by all requests
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
    max_image_bytes: usize,
}

impl ImageFetcher {
    /// Create a new image fetcher
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects));

        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            max_image_bytes: config.max_image_bytes,
        })
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    /// Download the bytes referenced by `reference`
    pub async fn fetch(&self, reference: &ImageReference) -> Result<FetchedImage, FetchError> {
        let url = reference.as_str();
        debug!("Downloading image from: {}", url);

        let mut response = self
            .client
            .get(reference.as_url().clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        if let Some(length) = response.content_length() {
            if length > self.max_image_bytes as u64 {
                return Err(FetchError::TooLarge {
                    limit: self.max_image_bytes,
                });
            }
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Content-Length is advisory; enforce the limit while streaming
        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::from_reqwest(e, url))?
        {
            if body.len() + chunk.len() > self.max_image_bytes {
                return Err(FetchError::TooLarge {
                    limit: self.max_image_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        info!("Downloaded {} bytes from: {}", body.len(), final_url);

        Ok(FetchedImage {
            final_url,
            content_type,
            bytes: body.freeze(),
        })
    }
}
