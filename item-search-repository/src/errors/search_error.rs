//! Search error types.
//!
//! This module defines the error types that can occur while talking to the
//! search engine.

use thiserror::Error;

/// Errors that can occur during search engine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The engine could not be reached (connection refused, timeout, DNS).
    #[error("Engine unreachable: {0}")]
    EngineUnreachable(String),

    /// The engine answered with a non-success status.
    #[error("Engine rejected request with status {status}: {body}")]
    EngineRejected { status: u16, body: String },

    /// Failed to parse a response from the engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the engine.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The client configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SearchError {
    /// Create an engine unreachable error.
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::EngineUnreachable(msg.into())
    }

    /// Create an engine rejected error.
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::EngineRejected {
            status,
            body: body.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// HTTP status returned by the engine, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::EngineRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure is transient and the call may succeed if repeated.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::EngineUnreachable(_) => true,
            Self::EngineRejected { status, .. } => *status == 429 || *status >= 500,
            Self::ParseError(_) | Self::SerializationError(_) | Self::InvalidConfig(_) => false,
        }
    }
}
