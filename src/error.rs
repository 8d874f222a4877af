// ============================================================================
// ERRORS - Error type shared by services, state and viewmodels
// ============================================================================

use std::fmt;

/// Error type for every fallible operation outside the map renderer
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerError {
    /// Local persistent storage unavailable or rejected the write
    Storage(String),
    /// JSON encode/decode failure
    Serialization(String),
    /// Request never got a response
    Network(String),
    /// Remote answered with a non-success status
    Http { status: u16, message: String },
    /// Remote directory rejected or failed an operation
    Remote(String),
    /// Identity provider failure
    Auth(String),
    /// Operation needs an authenticated session
    NotSignedIn,
    Map(String),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::Storage(msg) => write!(f, "Storage error: {}", msg),
            TrackerError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            TrackerError::Network(msg) => write!(f, "Network error: {}", msg),
            TrackerError::Http { status, message } => write!(f, "HTTP error {}: {}", status, message),
            TrackerError::Remote(msg) => write!(f, "Remote directory error: {}", msg),
            TrackerError::Auth(msg) => write!(f, "Authentication error: {}", msg),
            TrackerError::NotSignedIn => write!(f, "No user is signed in"),
            TrackerError::Map(msg) => write!(f, "Map error: {}", msg),
        }
    }
}

impl std::error::Error for TrackerError {}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Serialization(err.to_string())
    }
}
