//! Crate-wide error types.
//!
//! Three failure domains matter here: the network (unreachable server or a
//! non-2xx response), the local store (a SQLite transaction failed), and
//! serialization in between. None of them are fatal to the caller; the
//! orchestrator recovers from network errors via the local store and
//! reports store errors as degraded-mode status conditions.

use thiserror::Error;

/// Errors that can occur in dashboardr operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The server could not be reached (offline, timeout, transport failure).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status}")]
    Http { status: u16 },

    /// Local persistence failed (transaction aborted, nothing applied).
    #[error("local store error: {0}")]
    Store(#[from] sqlx::Error),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // reqwest only carries a status when the server actually answered;
        // everything else is a transport-level failure.
        match err.status() {
            Some(status) => Error::Http {
                status: status.as_u16(),
            },
            None => Error::Network(err.to_string()),
        }
    }
}

/// Result type alias for dashboardr operations.
pub type Result<T> = std::result::Result<T, Error>;
