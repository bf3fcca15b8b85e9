//! High-level voice session façade.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::client::{ConnectionState, VoiceClient};
use crate::config::Scenario;
use crate::credential::CredentialClient;
use crate::error::Result;
use crate::log::LogEntry;
use crate::webrtc::{TransportEvent, WebRtcTransport};

/// A live (or failed) voice training session.
///
/// Owns the [`VoiceClient`] state machine, the WebRTC transport handle and
/// the background pump that feeds transport events into the machine. All
/// mutation of session state goes through the machine; the pump and the
/// public methods are the only writers.
pub struct VoiceSession {
    session_id: String,
    client: Arc<Mutex<VoiceClient>>,
    transport: WebRtcTransport,
}

impl VoiceSession {
    /// Connect: fetch a short-lived credential from the relay at
    /// `relay_url`, then negotiate a realtime session for `scenario`.
    ///
    /// Either step failing aborts the whole flow: the state machine lands in
    /// [`ConnectionState::Failed`], the error is logged to the activity log,
    /// and the caller gets it back. Retry means calling `connect` again;
    /// nothing is automatic.
    pub async fn connect(relay_url: &str, scenario: Scenario) -> Result<Self> {
        let client = Arc::new(Mutex::new(VoiceClient::new(scenario)));
        client.lock().begin_connect();

        let credential_client = CredentialClient::new(relay_url)?;
        let credential = match credential_client.fetch().await {
            Ok(credential) => credential,
            Err(e) => {
                client.lock().connect_failed(&e);
                return Err(e);
            }
        };
        client.lock().credential_received(&credential);

        let (transport, mut events) =
            match WebRtcTransport::connect(&credential.ephemeral_key, &credential.model).await {
                Ok(pair) => pair,
                Err(e) => {
                    client.lock().connect_failed(&e);
                    return Err(e);
                }
            };

        let pump_client = client.clone();
        let pump_transport = transport.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    TransportEvent::Connected => pump_client.lock().peer_connected(),
                    TransportEvent::ChannelOpen => {
                        // The configuration message goes out exactly once,
                        // and only now that the channel reported open.
                        let update = pump_client.lock().channel_opened();
                        if let Some(update) = update {
                            match serde_json::to_string(&update) {
                                Ok(json) => {
                                    if let Err(e) = pump_transport.send_json(json).await {
                                        warn!("failed to send session.update: {e}");
                                    }
                                }
                                Err(e) => warn!("failed to serialize session.update: {e}"),
                            }
                        }
                    }
                    TransportEvent::Message(raw) => pump_client.lock().handle_message(&raw),
                    TransportEvent::RemoteAudio { bytes } => {
                        debug!(bytes, "remote audio frame");
                    }
                    TransportEvent::Disconnected => {
                        pump_client.lock().peer_disconnected();
                        break;
                    }
                }
            }
        });

        Ok(Self { session_id: uuid::Uuid::new_v4().to_string(), client, transport })
    }

    /// Unique id of this session.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.client.lock().state()
    }

    /// Snapshot of the activity log, oldest entry first.
    pub fn log_snapshot(&self) -> Vec<LogEntry> {
        self.client.lock().log().entries().to_vec()
    }

    /// Open the push-to-talk gate. No-op unless connected.
    pub fn start_talking(&self) -> bool {
        self.client.lock().start_talking()
    }

    /// Close the push-to-talk gate. No-op unless talking.
    pub fn stop_talking(&self) -> bool {
        self.client.lock().stop_talking()
    }

    /// Send one encoded Opus frame of microphone audio.
    ///
    /// Frames are silently dropped while the gate is closed: disabling
    /// transmission client-side is the whole point of push-to-talk, and a
    /// caller pumping a capture pipeline should not have to stop it.
    pub async fn send_audio_frame(&self, frame: Bytes) -> Result<()> {
        if !self.client.lock().mic_enabled() {
            return Ok(());
        }
        self.transport.send_audio_frame(frame).await
    }

    /// Disconnect and reset to idle.
    ///
    /// Idempotent: closing an already-closed session does nothing and never
    /// fails, even if the underlying handles are gone.
    pub async fn close(&self) {
        self.transport.close().await;
        self.client.lock().reset();
    }
}
