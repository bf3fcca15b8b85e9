//! Connection state machine for a voice training session.
//!
//! [`VoiceClient`] owns every piece of per-session state (connection phase,
//! push-to-talk gate, activity log, config-sent flag) and is deliberately
//! synchronous: the transport layer drives it with events, and tests drive
//! it with synthetic ones.

use tracing::debug;

use crate::config::{Scenario, SessionConfig};
use crate::credential::Credential;
use crate::error::RealtimeError;
use crate::events::{ClientEvent, ServerEvent};
use crate::log::{ActivityLog, Role};

/// Connection lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No session; `begin_connect` is accepted.
    #[default]
    Idle,
    /// Waiting on the relay for a short-lived credential.
    RequestingCredential,
    /// Peer connection set up, offer/answer in flight.
    Negotiating,
    /// Media and control channel established; talk controls enabled.
    Connected,
    /// Connected with the microphone gate open.
    Talking,
    /// A previously connected session ended. Terminal until `begin_connect`.
    Disconnected,
    /// The connect flow aborted. Terminal until `begin_connect`.
    Failed,
}

impl ConnectionState {
    /// Whether a new connect attempt may start from this state.
    fn can_connect(self) -> bool {
        matches!(
            self,
            ConnectionState::Idle | ConnectionState::Disconnected | ConnectionState::Failed
        )
    }

    /// Whether the session is live (talk controls available).
    pub fn is_connected(self) -> bool {
        matches!(self, ConnectionState::Connected | ConnectionState::Talking)
    }
}

/// Client-side session state machine.
#[derive(Debug, Default)]
pub struct VoiceClient {
    state: ConnectionState,
    scenario: Scenario,
    log: ActivityLog,
    session_update_sent: bool,
}

impl VoiceClient {
    /// Create an idle client for the given scenario.
    pub fn new(scenario: Scenario) -> Self {
        Self { scenario, ..Default::default() }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Selected scenario preset.
    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// Change the scenario. Only takes effect for the next session; ignored
    /// while a session is being set up or is live.
    pub fn set_scenario(&mut self, scenario: Scenario) -> bool {
        if self.state.can_connect() {
            self.scenario = scenario;
            true
        } else {
            false
        }
    }

    /// The user-visible activity log.
    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    /// Whether microphone audio may currently be transmitted.
    ///
    /// This gate is the sole client-side guarantee against unintended
    /// transmission; upstream VAD only governs turn-taking once audio flows.
    pub fn mic_enabled(&self) -> bool {
        self.state == ConnectionState::Talking
    }

    // ── Connect flow ────────────────────────────────────────────────────

    /// Start a connect attempt.
    ///
    /// Returns `false` (and logs) when a session is already live or a
    /// connect is outstanding: a second `connect()` is rejected rather than
    /// raced.
    pub fn begin_connect(&mut self) -> bool {
        if !self.state.can_connect() {
            self.log.append(Role::System, "Already connected.");
            return false;
        }
        self.state = ConnectionState::RequestingCredential;
        self.session_update_sent = false;
        self.log.append(Role::System, "Requesting ephemeral key from /api/token...");
        true
    }

    /// The relay returned a credential; negotiation starts.
    pub fn credential_received(&mut self, credential: &Credential) {
        debug_assert_eq!(self.state, ConnectionState::RequestingCredential);
        self.state = ConnectionState::Negotiating;
        self.log.append(
            Role::System,
            format!("Got ephemeral key. Opening peer connection for {}...", credential.model),
        );
    }

    /// A step of the connect flow failed; the whole attempt aborts.
    ///
    /// The machine lands in [`ConnectionState::Failed`], from which a fresh
    /// `begin_connect` is accepted (no automatic retry).
    pub fn connect_failed(&mut self, err: &RealtimeError) {
        self.state = ConnectionState::Failed;
        self.session_update_sent = false;
        self.log.append(Role::System, format!("Connection error: {err}"));
    }

    /// The peer connection reached its connected condition.
    pub fn peer_connected(&mut self) {
        if self.state == ConnectionState::Negotiating {
            self.state = ConnectionState::Connected;
            self.log.append(Role::System, "Connected to realtime endpoint.");
        }
    }

    /// The peer connection dropped out of the connected condition.
    pub fn peer_disconnected(&mut self) {
        if self.state.is_connected() {
            self.state = ConnectionState::Disconnected;
            self.log.append(Role::System, "Peer connection lost.");
        }
    }

    // ── Control channel ─────────────────────────────────────────────────

    /// The control channel reported open.
    ///
    /// Returns the single `session.update` configuration message on the
    /// first open of a session and `None` afterwards. The ordering is
    /// load-bearing: this message must reach the server before any user
    /// audio is expected to be transcribed correctly.
    pub fn channel_opened(&mut self) -> Option<ClientEvent> {
        if self.session_update_sent {
            return None;
        }
        self.session_update_sent = true;
        self.log.append(Role::System, "Control channel open. Sent session.update.");
        Some(ClientEvent::SessionUpdate { session: SessionConfig::for_scenario(self.scenario) })
    }

    /// Whether the configuration message has been emitted this session.
    pub fn session_update_sent(&self) -> bool {
        self.session_update_sent
    }

    /// Dispatch an inbound control-channel payload.
    ///
    /// Malformed payloads and unrecognized event kinds are discarded without
    /// touching the log or the connection state.
    pub fn handle_message(&mut self, raw: &str) {
        let Some(event) = ServerEvent::parse(raw) else {
            debug!("discarding malformed control message");
            return;
        };
        match event {
            ServerEvent::TextDelta { delta } => self.log.append(Role::Assistant, delta),
            ServerEvent::TranscriptCompleted { transcript } => {
                self.log.append(Role::User, transcript)
            }
            ServerEvent::ResponseCompleted => {
                self.log.append(Role::System, "Response complete.")
            }
            ServerEvent::Unknown => {}
        }
    }

    // ── Push-to-talk gate ───────────────────────────────────────────────

    /// Open the microphone gate. No-op unless the session is connected and
    /// not already talking.
    pub fn start_talking(&mut self) -> bool {
        if self.state != ConnectionState::Connected {
            return false;
        }
        self.state = ConnectionState::Talking;
        self.log.append(Role::System, "Microphone on.");
        true
    }

    /// Close the microphone gate. No-op unless currently talking.
    pub fn stop_talking(&mut self) -> bool {
        if self.state != ConnectionState::Talking {
            return false;
        }
        self.state = ConnectionState::Connected;
        self.log.append(Role::System, "Microphone off.");
        true
    }

    // ── Cleanup ─────────────────────────────────────────────────────────

    /// Reset all session state back to idle.
    ///
    /// Idempotent: safe to call when already idle or disconnected, and never
    /// fails. The activity log is kept.
    pub fn reset(&mut self) {
        if self.state != ConnectionState::Idle {
            self.log.append(Role::System, "Session closed.");
        }
        self.state = ConnectionState::Idle;
        self.session_update_sent = false;
    }
}
