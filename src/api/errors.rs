//! Registry API error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Registry API error (status {status}): {body}")]
    Status {
        status: u16,
        body: String,
        headers: String,
    },

    #[error("Failed to parse registry response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid registry URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Status, body and headers when the backend answered with an error
    pub fn response_details(&self) -> Option<(u16, &str, &str)> {
        match self {
            ApiError::Status {
                status,
                body,
                headers,
            } => Some((*status, body.as_str(), headers.as_str())),
            _ => None,
        }
    }
}
