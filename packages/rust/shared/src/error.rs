//! Error types for the enhancer pipeline.
//!
//! Library crates use [`EnhancerError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` and maps each variant to an exit code.

use std::path::PathBuf;

/// Top-level error type for all enhancer operations.
#[derive(Debug, thiserror::Error)]
pub enum EnhancerError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network failure or timeout while talking to the content API.
    #[error("transport error: {0}")]
    Transport(String),

    /// The content API answered with a non-success status.
    #[error("content API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The content API rejected the payload (duplicate slug, missing field, ...).
    #[error("content API rejected the payload (HTTP {status}): {message}")]
    Validation { status: u16, message: String },

    /// Fetching or extracting a reference page failed.
    #[error("scrape error for {url}: {message}")]
    Scrape { url: String, message: String },

    /// The enhancement provider failed to produce text.
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EnhancerError>;

impl EnhancerError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a scrape error for `url`.
    pub fn scrape(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Scrape {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error from a rejected response.
    pub fn validation(status: u16, msg: impl Into<String>) -> Self {
        Self::Validation {
            status,
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for a run that failed with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } | Self::Io { .. } => 2,
            Self::Transport(_) => 3,
            Self::Api { .. } => 4,
            Self::Validation { .. } => 5,
            Self::Scrape { .. } => 6,
            Self::Synthesis(_) => 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = EnhancerError::config("base_url is not a valid URL");
        assert_eq!(err.to_string(), "config error: base_url is not a valid URL");

        let err = EnhancerError::scrape("https://example.com/post", "HTTP 503");
        assert_eq!(
            err.to_string(),
            "scrape error for https://example.com/post: HTTP 503"
        );

        let err = EnhancerError::validation(422, r#"{"slug":["taken"]}"#);
        assert!(err.to_string().contains("HTTP 422"));
        assert!(err.to_string().contains("taken"));
    }

    #[test]
    fn exit_codes_are_distinct_per_failure_kind() {
        let errors = [
            EnhancerError::config("x"),
            EnhancerError::Transport("x".into()),
            EnhancerError::Api {
                status: 500,
                body: String::new(),
            },
            EnhancerError::validation(422, "x"),
            EnhancerError::scrape("u", "x"),
            EnhancerError::Synthesis("x".into()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(EnhancerError::exit_code).collect();
        assert!(codes.iter().all(|&c| c > 1));
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
