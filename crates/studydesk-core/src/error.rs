//! Error types.
//!
//! `ApiError` describes transport-level failures reported by a backend
//! implementation. `StudyError` is what store operations return: it carries
//! the user-facing message that also lands in the store's `error` field.

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Failures surfaced by store operations.
#[derive(Debug, Error)]
pub enum StudyError {
    /// A backend request failed.
    #[error("{message}")]
    Fetch {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// Client-side input was rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// A referenced entity is absent after loading.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },
}

impl StudyError {
    pub fn fetch(message: impl Into<String>, source: anyhow::Error) -> Self {
        StudyError::Fetch {
            message: message.into(),
            source,
        }
    }

    /// The message shown to the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Returns `true` if the backend reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            StudyError::NotFound { .. } => true,
            StudyError::Fetch { source, .. } => {
                matches!(source.downcast_ref::<ApiError>(), Some(ApiError::NotFound(_)))
            }
            StudyError::Validation(_) => false,
        }
    }
}
