//! Error taxonomy for the publisher

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading content or talking to the remote CMS
#[derive(Debug, Error)]
pub enum PublishError {
    /// Missing or invalid connection parameters; fatal before any network call
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed frontmatter or a missing required field; the affected post is skipped
    #[error("failed to parse {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// A local asset referenced by a post does not exist
    #[error("local file not found: {0:?}")]
    NotFound(PathBuf),

    /// The remote API answered with a non-2xx status
    #[error("remote API returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// Transport-level failure (connection refused, timeout, TLS)
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A 2xx response whose body did not match the expected shape
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PublishError {
    /// Build a `Remote` error from a response, truncating the body for logs
    pub fn from_response(status: u16, body: &str) -> Self {
        let body = if body.len() > 200 {
            let cut = body
                .char_indices()
                .take_while(|(i, _)| *i < 200)
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            format!("{}...", &body[..cut])
        } else {
            body.to_string()
        };
        PublishError::Remote { status, body }
    }
}

pub type Result<T> = std::result::Result<T, PublishError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_body_truncated() {
        let long = "x".repeat(500);
        let err = PublishError::from_response(500, &long);
        match err {
            PublishError::Remote { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), 203); // 200 chars + "..."
            }
            _ => panic!("expected Remote"),
        }
    }

    #[test]
    fn test_remote_body_short_kept() {
        let err = PublishError::from_response(404, "not found");
        match err {
            PublishError::Remote { body, .. } => assert_eq!(body, "not found"),
            _ => panic!("expected Remote"),
        }
    }
}
