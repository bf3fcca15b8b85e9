//! Error types for the realtime client.

use thiserror::Error;

/// Result type for realtime client operations.
pub type Result<T> = std::result::Result<T, RealtimeError>;

/// Errors that can occur while establishing or running a voice session.
#[derive(Error, Debug)]
pub enum RealtimeError {
    /// Fetching the short-lived credential from the relay failed.
    #[error("credential fetch failed: {0}")]
    CredentialFetch(String),

    /// SDP offer/answer negotiation with the realtime endpoint failed.
    #[error("session negotiation failed: {0}")]
    Negotiation(String),

    /// Local media (audio track) could not be acquired or written.
    #[error("media error: {0}")]
    Media(String),

    /// An operation was attempted while the session is not connected.
    #[error("session not connected")]
    NotConnected,

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RealtimeError {
    /// Create a new credential fetch error.
    pub fn credential<S: Into<String>>(msg: S) -> Self {
        Self::CredentialFetch(msg.into())
    }

    /// Create a new negotiation error.
    pub fn negotiation<S: Into<String>>(msg: S) -> Self {
        Self::Negotiation(msg.into())
    }

    /// Create a new media error.
    pub fn media<S: Into<String>>(msg: S) -> Self {
        Self::Media(msg.into())
    }
}
