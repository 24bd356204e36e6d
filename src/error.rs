//! Failure types for the pipeline.
//!
//! Failures are the second of the two outcome channels: a pipe that declines
//! an exchange returns `Ok(Outcome::NotMatched)`, a pipe that genuinely
//! errored returns `Err(PipeError)`. The two are never converted into each
//! other.

use thiserror::Error;

/// Boxed error coming from a foreign collaborator (body stream, wrapped service).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while running a pipe.
#[derive(Debug, Error)]
pub enum PipeError {
    /// The request body could not be read (stream error or size limit).
    #[error("Failed to read request body: {0}")]
    Body(#[source] BoxError),

    /// A percent-encoded component did not decode to UTF-8.
    #[error("Invalid percent-encoding in {0:?}")]
    Decode(String),

    /// A buffered body was expected to be UTF-8 text.
    #[error("Request body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A header name or value could not be represented on the wire.
    #[error("Invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// A status code outside 100..=999.
    #[error("Invalid status code {0}")]
    InvalidStatus(u16),

    /// A reason phrase with bytes not allowed on a status line.
    #[error("Invalid reason phrase {0:?}")]
    InvalidReason(String),

    /// A base64 payload handed to the body writer did not decode.
    #[error("Invalid base64 body payload: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// A wrapped host handler reported an error.
    #[error("Wrapped handler failed: {0}")]
    Handler(#[source] BoxError),

    /// The exchange ran past the host's request timeout.
    #[error("Exchange exceeded the {0:?} request timeout")]
    Timeout(std::time::Duration),
}

impl PipeError {
    pub(crate) fn header(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        PipeError::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors raised when a path pattern is registered.
#[derive(Debug, Error)]
pub enum PatternError {
    /// A `:` sigil with no name after it.
    #[error("Empty placeholder name in pattern {0:?}")]
    EmptyName(String),

    /// The same placeholder name declared twice.
    #[error("Placeholder {name:?} declared more than once in pattern {pattern:?}")]
    DuplicateName { pattern: String, name: String },

    /// The generated expression was rejected by the regex engine.
    #[error("Pattern {pattern:?} did not compile: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
