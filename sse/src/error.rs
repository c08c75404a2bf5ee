//! Error types for the `sse` broker.
//!
//! Follows the same pattern as the other layers: a root `Error` struct holding an
//! `error_kind` plus an optional `source` for chaining.

use std::error::Error as StdError;
use std::fmt;

pub type Result<T> = core::result::Result<T, Error>;

/// Top-level error type for broker operations.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Kinds of errors the broker can report.
///
/// These are expected outcomes rather than faults; callers surface them without retrying.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// A publish named a topic that nobody has ever subscribed to.
    TopicNotFound(String),
}

impl Error {
    pub fn topic_not_found(topic: &str) -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::TopicNotFound(topic.to_string()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::TopicNotFound(topic) => write!(f, "Broker Error: topic not found: {topic}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
