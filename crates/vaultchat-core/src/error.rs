//! Error types for the vaultchat crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the whole conversation pipeline.
///
/// Nothing in this taxonomy is fatal to the host process: every variant
/// degrades to "this turn did not complete" or "history did not load,
/// starting fresh".
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum VaultError {
    /// File system failure while reading or writing the transcript.
    #[error("IO error: {message}")]
    Io { message: String },

    /// Persisted data could not be decoded.
    #[error("Parse error: {format} - {message}")]
    Parse { format: String, message: String },

    /// A persisted entry references a speaker the live registry does not know.
    #[error("Unknown speaker: '{name}' is not in the profile registry")]
    UnknownSpeaker { name: String },

    /// The completion provider call failed or timed out.
    #[error("Gateway error: {message}")]
    Gateway { message: String, retryable: bool },

    /// A submit arrived while a completion request was already in flight.
    #[error("A completion request is already in flight")]
    Busy,

    /// Configuration error (missing key, bad profile asset, etc.).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VaultError {
    /// Creates an IO error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Parse error for the given wire format ("JSON", "TOML", ...).
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Creates an UnknownSpeaker error.
    pub fn unknown_speaker(name: impl Into<String>) -> Self {
        Self::UnknownSpeaker { name: name.into() }
    }

    /// Creates a non-retryable Gateway error.
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway {
            message: message.into(),
            retryable: false,
        }
    }

    /// Creates a Gateway error with an explicit retryable flag.
    pub fn gateway_with_retryable(message: impl Into<String>, retryable: bool) -> Self {
        Self::Gateway {
            message: message.into(),
            retryable,
        }
    }

    /// Creates a Config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Check if this is the busy/backpressure rejection.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    /// Check if this is a gateway failure that is worth retrying.
    pub fn is_retryable_gateway(&self) -> bool {
        matches!(self, Self::Gateway { retryable: true, .. })
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for VaultError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, VaultError>`.
pub type Result<T> = std::result::Result<T, VaultError>;
