//! Error type shared by every API module and view.
//!
//! # Design
//! All failures collapse into one shape: a [`ErrorKind`], a human-readable
//! message and, for backend errors, the JSON payload the server sent. Views
//! display [`ApiError::message_or`] and never match on transport details.

use thiserror::Error;

/// Coarse classification used by views to decide what to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a response.
    Transport,
    /// The backend answered with a non-2xx status.
    Backend,
    /// Input was rejected before any request was issued.
    Validation,
    /// Anything else: encoding, decoding, local storage.
    Unexpected,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("{}", .message.as_deref().unwrap_or("request failed"))]
    Backend {
        status: u16,
        message: Option<String>,
        payload: Option<serde_json::Value>,
    },

    #[error("{0}")]
    InvalidInput(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Backend { .. } => ErrorKind::Backend,
            ApiError::InvalidInput(_) => ErrorKind::Validation,
            ApiError::Serialization(_) | ApiError::Deserialization(_) | ApiError::Storage(_) => {
                ErrorKind::Unexpected
            }
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status for backend errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw JSON body the backend sent with its error, if it was JSON.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            ApiError::Backend { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Message a user should see: the backend's own message, a validation
    /// message, or `fallback` for everything else.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Backend {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::InvalidInput(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Replaces a missing backend message, or a transport failure, with
    /// `fallback`. Used by the auth calls.
    pub(crate) fn with_fallback(self, fallback: &str) -> Self {
        match self {
            ApiError::Backend {
                status,
                message: None,
                payload,
            } => ApiError::Backend {
                status,
                message: Some(fallback.to_string()),
                payload,
            },
            ApiError::Transport(_) => ApiError::Transport(fallback.to_string()),
            other => other,
        }
    }
}
