//! Error types for the Appwrite client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppwriteError {
    /// The backend answered with a non-2xx status code.
    #[error("Appwrite error {status} ({kind}): {message}")]
    Api { status: u16, message: String, kind: String },

    /// An error from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The endpoint could not be parsed.
    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// A generic error string.
    #[error("{0}")]
    Other(String),
}

impl AppwriteError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

pub type Result<T> = std::result::Result<T, AppwriteError>;
