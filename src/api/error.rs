//! Errors raised by the personas backend.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("persona física {0} not found")]
    NotFound(String),
}
