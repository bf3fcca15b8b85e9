//! Control-channel event types.
//!
//! The realtime endpoint exchanges JSON messages with a `type` discriminator
//! over the `oai-events` data channel. Only the event kinds the client acts
//! on are modelled; everything else deserializes to [`ServerEvent::Unknown`]
//! and is ignored.

use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;

// ── Client Events ───────────────────────────────────────────────────────

/// Events sent from the client to the realtime server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Update session configuration. Sent exactly once, after the control
    /// channel reports open and before any user audio is expected to be
    /// transcribed.
    #[serde(rename = "session.update")]
    SessionUpdate {
        /// Session configuration payload.
        session: SessionConfig,
    },
}

// ── Server Events ───────────────────────────────────────────────────────

/// Events received from the realtime server over the control channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Chunk of streamed assistant text.
    #[serde(rename = "response.output_text.delta")]
    TextDelta {
        /// Text fragment.
        delta: String,
    },

    /// Transcription of the user's spoken input completed.
    #[serde(rename = "conversation.item.input_audio_transcription.completed")]
    TranscriptCompleted {
        /// Full transcript of the user's turn.
        transcript: String,
    },

    /// The assistant finished its response.
    #[serde(rename = "response.completed")]
    ResponseCompleted,

    /// Unrecognized event type (for forward compatibility).
    #[serde(other)]
    Unknown,
}

impl ServerEvent {
    /// Parse a raw control-channel payload.
    ///
    /// Malformed JSON yields `None`: transient parse noise must not
    /// interrupt an otherwise healthy session, so callers discard it
    /// without surfacing an error.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}
