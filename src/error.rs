use std::fmt;

use thiserror::Error;

/// Errors that can occur while talking to the remote tree provider
#[derive(Error, Debug)]
pub enum BrowseError {
    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited by remote service: {message}")]
    RateLimited { message: String },

    #[error("Malformed response: {message}")]
    Malformed { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Fetch task failed: {message}")]
    TaskFailed { message: String },
}

impl BrowseError {
    /// Classify this error into the coarse taxonomy observers see
    pub fn kind(&self) -> ErrorKind {
        match self {
            BrowseError::NotFound { .. } => ErrorKind::NotFound,
            BrowseError::Network(_) | BrowseError::Io(_) | BrowseError::TaskFailed { .. } => {
                ErrorKind::Network
            }
            BrowseError::RateLimited { .. } => ErrorKind::RateLimited,
            BrowseError::Malformed { .. }
            | BrowseError::InvalidConfig { .. }
            | BrowseError::Serialization(_) => ErrorKind::Malformed,
        }
    }
}

/// Coarse failure category exposed through the navigation snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport or connectivity failure
    Network,
    /// Path or file no longer exists
    NotFound,
    /// Calling quota exhausted
    RateLimited,
    /// Response shape unexpected
    Malformed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Network => "network",
            ErrorKind::NotFound => "not found",
            ErrorKind::RateLimited => "rate limited",
            ErrorKind::Malformed => "malformed",
        };
        f.write_str(label)
    }
}

/// Cloneable error descriptor kept in the navigation state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<BrowseError> for FetchError {
    fn from(err: BrowseError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

/// Result type alias for browsing operations
pub type Result<T> = std::result::Result<T, BrowseError>;
