//! Error types for the Corpo client.

use crate::transport::TransportError;
use crate::validation::ValidationError;
use thiserror::Error;

/// A shared error type for the entire Corpo client.
///
/// Transport failures keep their full [`TransportError`] so callers can still
/// inspect the HTTP status; everything else is flattened into message-bearing
/// variants.
#[derive(Error, Debug, Clone)]
pub enum CorpoError {
    /// The backend call failed (network, HTTP status or undecodable body)
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A form check failed before anything was sent
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A token refresh was requested but no refresh token is held
    #[error("No refresh token available")]
    NoRefreshToken,

    /// A local message was addressed by an id that is not in the log
    #[error("Message not found: '{0}'")]
    MessageNotFound(String),

    /// A failed message can not be re-sent (its payload is gone)
    #[error("Message '{0}' can not be retried: original attachment is no longer available")]
    RetryUnavailable(String),

    /// Key/value storage error
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CorpoError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if the backend rejected the credentials (HTTP 401)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_unauthorized())
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a storage error
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// The message the backend attached to a failed response, if any.
    ///
    /// Stores use this to fill their `error` field, falling back to their own
    /// default text when the server said nothing useful.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Transport(err) => err.server_message(),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CorpoError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CorpoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CorpoError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for CorpoError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (transitional, should be removed eventually)
impl From<anyhow::Error> for CorpoError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, CorpoError>`.
pub type Result<T> = std::result::Result<T, CorpoError>;
