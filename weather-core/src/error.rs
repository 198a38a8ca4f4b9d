//! Failure kinds surfaced by every fetch operation.

use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The location identifier failed a format check; nothing was sent.
    #[error("Invalid location: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    /// Upstream answered with a non-2xx status. `body` holds the full response text.
    #[error("Upstream responded with status {code}: {}", truncate_body(.body))]
    HttpStatus { code: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key in its query string.
        let err = err.without_url();

        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(error_chain(&err))
        } else {
            FetchError::Network(error_chain(&err))
        }
    }
}

impl FetchError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Whether repeating the same call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::Timeout => true,
            FetchError::HttpStatus { code, .. } => *code == 429 || *code >= 500,
            FetchError::Validation(_) | FetchError::Decode(_) => false,
        }
    }
}

/// `err` followed by each of its sources, joined with ": ".
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
