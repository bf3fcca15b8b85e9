//! # pitchcoach-realtime
//!
//! Client side of the PitchCoach sales-training voice assistant: fetches a
//! short-lived credential from the relay, opens a WebRTC session with the
//! realtime voice endpoint (one audio send track, one receive track, one
//! `oai-events` control channel), gates microphone transmission behind
//! push-to-talk, and renders transcript/response events into an append-only
//! activity log.
//!
//! ## Architecture
//!
//! ```text
//!   VoiceSession ──► CredentialClient ──► relay (GET /api/token)
//!        │
//!        ├──► WebRtcTransport (str0m, Sans-IO, tokio drive loop)
//!        │         │  SDP offer ⇄ answer (Bearer ephemeral key)
//!        │         └─ oai-events control channel + Opus audio track
//!        │
//!        └──► VoiceClient (state machine + ActivityLog, fully synchronous)
//! ```
//!
//! The state machine is a plain struct the transport drives with events, so
//! tests exercise connection semantics, push-to-talk gating and event
//! dispatch without a live media stack.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pitchcoach_realtime::{Scenario, VoiceSession};
//!
//! let session = VoiceSession::connect("http://localhost:3000", Scenario::AngryCustomer).await?;
//!
//! session.start_talking();
//! // pump encoded microphone frames while the button is held
//! session.send_audio_frame(frame).await?;
//! session.stop_talking();
//!
//! for entry in session.log_snapshot() {
//!     println!("{:?}: {}", entry.role, entry.text);
//! }
//! session.close().await;
//! ```

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod events;
pub mod log;
pub mod session;
pub mod webrtc;

// Re-exports
pub use client::{ConnectionState, VoiceClient};
pub use config::{Scenario, SessionConfig, TranscriptionConfig, TurnDetection, VadMode};
pub use credential::{Credential, CredentialClient};
pub use error::{RealtimeError, Result};
pub use events::{ClientEvent, ServerEvent};
pub use log::{ActivityLog, LogEntry, Role};
pub use session::VoiceSession;
pub use webrtc::{TransportEvent, WebRtcTransport};
