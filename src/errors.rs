//! Error types for the crawler.
//!
//! Errors fall into two tiers. *Global* errors abort a whole crawl mode
//! because no meaningful partial result exists without the element or page
//! that failed (the PEP numerical index, the "All versions" sidebar list).
//! *Local* problems (one unreachable detail page, one page missing its status
//! field) never become errors at all: they are reported as
//! [`Diagnostic`](crate::diagnostics::Diagnostic)s and the item is skipped.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ParserError>;

#[derive(Error, Debug)]
pub enum ParserError {
    /// The Tag Locator found no element matching the tag name and filters.
    ///
    /// `attrs` is the rendered filter set, e.g. `{id="numerical-index"}`.
    #[error("tag <{tag}> not found with attributes {attrs}")]
    TagNotFound { tag: String, attrs: String },

    /// A required anchor structure is missing from an otherwise valid page.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("cache entry error: {0}")]
    Cache(#[from] serde_json::Error),
}

impl ParserError {
    /// Whether this error means the whole mode invocation has to stop.
    ///
    /// Structural absences are global when they surface as errors: per-item
    /// absences are handled as diagnostics before they ever get here.
    pub fn is_global(&self) -> bool {
        matches!(self, ParserError::TagNotFound { .. } | ParserError::NotFound(_))
    }
}
