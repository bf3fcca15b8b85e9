//! # pitchcoach-relay
//!
//! Server side of the PitchCoach voice assistant: a stateless HTTP relay
//! that mints short-lived realtime session credentials from an upstream
//! provider. The long-lived upstream secret lives only in this process's
//! environment and never reaches a client.
//!
//! One operation: `GET /api/token` → `{ "ephemeralKey": ..., "model": ... }`.
//! Failures come back as structured JSON errors (see [`error::RelayError`]).

pub mod config;
pub mod error;
pub mod mint;
pub mod routes;

pub use config::RelayConfig;
pub use error::RelayError;
pub use mint::TokenResponse;
pub use routes::create_app;
