// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Validated image locators

use std::fmt;

use thiserror::Error;
use url::Url;

/// Reasons a string is rejected as an image reference
#[derive(Debug, Error, PartialEq)]
pub enum ImageReferenceError {
    #[error("URL is empty")]
    Empty,

    #[error("malformed URL: {0}")]
    Malformed(#[from] url::ParseError),

    #[error("unsupported URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,
}

/// An absolute http(s) URL pointing at a remotely hosted image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference(Url);

impl ImageReference {
    /// Parse and validate a raw URL string
    pub fn parse(raw: &str) -> Result<Self, ImageReferenceError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ImageReferenceError::Empty);
        }

        let url = Url::parse(trimmed)?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ImageReferenceError::UnsupportedScheme(other.to_string())),
        }

        if url.host_str().map(str::is_empty).unwrap_or(true) {
            return Err(ImageReferenceError::MissingHost);
        }

        Ok(Self(url))
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
