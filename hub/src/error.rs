//! Error types for the `hub` crate.
//!
//! Follows the same pattern as the other layers: a root `Error` struct carrying an
//! optional source and an `error_kind` that callers match on. None of these errors
//! ever reach a publisher; they are used internally to decide when a connection has
//! to be dropped, and by the upgrade glue to learn that the hub is no longer
//! accepting connections.
use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: HubErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubErrorKind {
    /// Reading from or writing to the underlying transport failed or timed out.
    Transport,
    /// The connection's outbound queue is at capacity (slow consumer).
    QueueFull,
    /// The connection is closing or closed and no longer accepts messages.
    Closed,
    /// The hub has been shut down and no longer accepts requests.
    Shutdown,
    /// A message could not be serialized to its wire representation.
    Serialization,
    /// The hub was started with settings its connections cannot run with.
    InvalidConfig,
}

impl Error {
    pub fn new(error_kind: HubErrorKind) -> Self {
        Self {
            source: None,
            error_kind,
        }
    }

    pub fn transport<E>(err: E) -> Self
    where
        E: fmt::Display,
    {
        Self {
            source: Some(err.to_string().into()),
            error_kind: HubErrorKind::Transport,
        }
    }

    pub fn shutdown() -> Self {
        Self::new(HubErrorKind::Shutdown)
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self {
            source: Some(reason.into().into()),
            error_kind: HubErrorKind::InvalidConfig,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Hub Error: {:?} ({source})", self.error_kind),
            None => write!(f, "Hub Error: {:?}", self.error_kind),
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

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: HubErrorKind::Serialization,
        }
    }
}

impl From<axum::Error> for Error {
    fn from(err: axum::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: HubErrorKind::Transport,
        }
    }
}
