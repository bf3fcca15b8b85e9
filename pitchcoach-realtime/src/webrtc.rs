//! Sans-IO WebRTC transport for the realtime endpoint.
//!
//! Built on `str0m`: the peer connection is a pure state machine, and a
//! background tokio task drives it against one UDP socket. The transport
//! exposes two mpsc channels — commands in (data-channel JSON, Opus audio
//! frames, close) and events out (connected, channel open, inbound control
//! messages, disconnect) — so the session layer never touches the media
//! stack directly.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use bytes::Bytes;
use str0m::change::SdpAnswer;
use str0m::channel::ChannelId;
use str0m::media::{Direction, Frequency, MediaKind, MediaTime, Mid, Pt};
use str0m::net::{Protocol, Receive};
use str0m::{Event, IceConnectionState, Input, Output, Rtc};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{RealtimeError, Result};

/// Realtime endpoint base URL for SDP signaling.
const REALTIME_BASE_URL: &str = "https://api.openai.com/v1/realtime";

/// Label of the control-message data channel. The endpoint requires this
/// exact label.
const DATA_CHANNEL_LABEL: &str = "oai-events";

/// Events surfaced by the drive loop to the session layer.
#[derive(Debug)]
pub enum TransportEvent {
    /// The peer connection reached its connected condition.
    Connected,
    /// The control channel is open and writable.
    ChannelOpen,
    /// An inbound control-channel payload (raw JSON text).
    Message(String),
    /// Remote audio arrived. The payload is not decoded; the size is kept
    /// for diagnostics only.
    RemoteAudio {
        /// Encoded frame size in bytes.
        bytes: usize,
    },
    /// The peer connection left the connected condition or the loop ended.
    Disconnected,
}

/// Commands accepted by the drive loop.
#[derive(Debug)]
pub enum TransportCommand {
    /// Write a JSON payload to the control channel.
    SendJson(String),
    /// Write one encoded Opus frame to the outbound audio track.
    SendAudioFrame(Bytes),
    /// Tear the connection down.
    Close,
}

/// Handle to a negotiated WebRTC connection.
///
/// Dropping the handle (or sending [`TransportCommand::Close`]) ends the
/// drive loop, which closes the control channel and the peer connection.
#[derive(Debug, Clone)]
pub struct WebRtcTransport {
    cmd_tx: mpsc::Sender<TransportCommand>,
}

impl WebRtcTransport {
    /// Establish a connection to the realtime endpoint.
    ///
    /// Performs the full negotiation: creates the peer connection with one
    /// bidirectional audio m-line and the control channel, generates the
    /// local offer, exchanges it over HTTPS with the short-lived credential
    /// as bearer authorization, and applies the returned answer. Any step
    /// failure aborts with [`RealtimeError::Negotiation`].
    ///
    /// Returns the command handle and the event receiver for the session
    /// layer to consume.
    pub async fn connect(
        ephemeral_key: &str,
        model: &str,
    ) -> Result<(Self, mpsc::Receiver<TransportEvent>)> {
        Self::connect_to(ephemeral_key, model, REALTIME_BASE_URL).await
    }

    /// Like [`WebRtcTransport::connect`], against an explicit signaling base
    /// URL.
    pub async fn connect_to(
        ephemeral_key: &str,
        model: &str,
        signaling_base: &str,
    ) -> Result<(Self, mpsc::Receiver<TransportEvent>)> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        let local_addr = socket.local_addr()?;

        let mut rtc = Rtc::new(Instant::now());

        let candidate = str0m::Candidate::host(local_addr, "udp")
            .map_err(|e| RealtimeError::negotiation(format!("host candidate: {e}")))?;
        rtc.add_local_candidate(candidate);

        let mut changes = rtc.sdp_api();
        let audio_mid = changes.add_media(MediaKind::Audio, Direction::SendRecv, None, None, None);
        let channel_id = changes.add_channel(DATA_CHANNEL_LABEL.to_string());
        let (offer, pending) = changes
            .apply()
            .ok_or_else(|| RealtimeError::negotiation("no SDP changes to apply"))?;

        debug!(%audio_mid, ?channel_id, "generated local SDP offer");

        let answer_sdp =
            exchange_sdp(signaling_base, model, ephemeral_key, offer.to_sdp_string()).await?;

        let answer = SdpAnswer::from_sdp_string(&answer_sdp)
            .map_err(|e| RealtimeError::negotiation(format!("invalid SDP answer: {e}")))?;
        rtc.sdp_api()
            .accept_answer(pending, answer)
            .map_err(|e| RealtimeError::negotiation(format!("applying SDP answer: {e}")))?;

        // Resolve the negotiated Opus payload type; Opus is the only audio
        // codec offered, so the first parameter set is the one.
        let (opus_pt, clock_rate) = {
            let writer = rtc
                .writer(audio_mid)
                .ok_or_else(|| RealtimeError::negotiation("audio writer missing after answer"))?;
            let params = writer.payload_params().next().ok_or_else(|| {
                RealtimeError::negotiation("no audio payload type negotiated")
            })?;
            (params.pt(), params.spec().clock_rate)
        };

        info!(%audio_mid, "SDP handshake complete");

        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (event_tx, event_rx) = mpsc::channel(64);

        tokio::spawn(drive_loop(DriveState {
            rtc,
            socket,
            local_addr,
            audio_mid,
            channel_id,
            opus_pt,
            clock_rate,
            cmd_rx,
            event_tx,
        }));

        Ok((Self { cmd_tx }, event_rx))
    }

    /// Queue a JSON payload for the control channel.
    pub async fn send_json(&self, json: String) -> Result<()> {
        self.cmd_tx
            .send(TransportCommand::SendJson(json))
            .await
            .map_err(|_| RealtimeError::NotConnected)
    }

    /// Queue one encoded Opus frame for the outbound audio track.
    pub async fn send_audio_frame(&self, frame: Bytes) -> Result<()> {
        self.cmd_tx
            .send(TransportCommand::SendAudioFrame(frame))
            .await
            .map_err(|_| RealtimeError::NotConnected)
    }

    /// Signal the drive loop to close the connection. Safe to call more
    /// than once; a loop that already ended just ignores it.
    pub async fn close(&self) {
        let _ = self.cmd_tx.send(TransportCommand::Close).await;
    }
}

struct DriveState {
    rtc: Rtc,
    socket: UdpSocket,
    local_addr: SocketAddr,
    audio_mid: Mid,
    channel_id: ChannelId,
    opus_pt: Pt,
    clock_rate: Frequency,
    cmd_rx: mpsc::Receiver<TransportCommand>,
    event_tx: mpsc::Sender<TransportEvent>,
}

/// Drive the Sans-IO peer connection: shuttle datagrams between the UDP
/// socket and `Rtc`, honor its timers, surface events, and apply commands.
async fn drive_loop(mut st: DriveState) {
    let mut net_buf = vec![0u8; 2000];
    // Running RTP offset for outbound audio, in clock-rate samples.
    let mut sample_offset: u64 = 0;

    'outer: loop {
        // Drain outputs until the state machine asks for a timer.
        let deadline = loop {
            match st.rtc.poll_output() {
                Ok(Output::Timeout(t)) => break t,
                Ok(Output::Transmit(tx)) => {
                    if let Err(e) = st.socket.send_to(&tx.contents, tx.destination).await {
                        warn!("UDP send failure: {e}");
                    }
                }
                Ok(Output::Event(event)) => {
                    if !dispatch_event(&mut st, event).await {
                        break 'outer;
                    }
                }
                Err(e) => {
                    warn!("peer connection error: {e}");
                    break 'outer;
                }
            }
        };

        if !st.rtc.is_alive() {
            break;
        }

        let now = Instant::now();
        let sleep = if deadline > now { deadline - now } else { Duration::from_millis(1) };

        tokio::select! {
            biased;

            res = st.socket.recv_from(&mut net_buf) => {
                if let Ok((n, source)) = res {
                    match (&net_buf[..n]).try_into() {
                        Ok(contents) => {
                            let receive = Receive {
                                proto: Protocol::Udp,
                                source,
                                destination: st.local_addr,
                                contents,
                            };
                            if let Err(e) = st.rtc.handle_input(Input::Receive(Instant::now(), receive)) {
                                warn!("dropping inbound datagram: {e}");
                            }
                        }
                        // Not a datagram str0m understands (e.g. stray traffic).
                        Err(_) => {}
                    }
                }
            }

            cmd = st.cmd_rx.recv() => {
                match cmd {
                    Some(TransportCommand::SendJson(json)) => {
                        if let Some(mut channel) = st.rtc.channel(st.channel_id) {
                            if let Err(e) = channel.write(true, json.as_bytes()) {
                                warn!("control channel write failed: {e}");
                            }
                        } else {
                            warn!("control channel not available, dropping message");
                        }
                    }
                    Some(TransportCommand::SendAudioFrame(frame)) => {
                        sample_offset = write_audio_frame(&mut st.rtc, st.audio_mid, st.opus_pt, st.clock_rate, sample_offset, frame);
                    }
                    Some(TransportCommand::Close) | None => {
                        st.rtc.disconnect();
                        break;
                    }
                }
            }

            _ = tokio::time::sleep(sleep) => {
                if let Err(e) = st.rtc.handle_input(Input::Timeout(Instant::now())) {
                    warn!("timer handling failed: {e}");
                    break;
                }
            }
        }
    }

    let _ = st.event_tx.send(TransportEvent::Disconnected).await;
    debug!("drive loop ended");
}

/// Surface one str0m event. Returns `false` when the loop should end.
async fn dispatch_event(st: &mut DriveState, event: Event) -> bool {
    match event {
        Event::Connected => {
            info!("peer connection established");
            let _ = st.event_tx.send(TransportEvent::Connected).await;
        }
        Event::ChannelOpen(id, label) if id == st.channel_id => {
            info!(%label, "control channel open");
            let _ = st.event_tx.send(TransportEvent::ChannelOpen).await;
        }
        Event::ChannelData(data) if data.id == st.channel_id => {
            let text = String::from_utf8_lossy(&data.data).into_owned();
            let _ = st.event_tx.send(TransportEvent::Message(text)).await;
        }
        Event::MediaData(media) => {
            // Synthesized audio from the remote track; relayed as-is, never
            // decoded here.
            let _ = st
                .event_tx
                .send(TransportEvent::RemoteAudio { bytes: media.data.len() })
                .await;
        }
        Event::IceConnectionStateChange(state) => {
            debug!(?state, "ICE connection state");
            if state == IceConnectionState::Disconnected {
                return false;
            }
        }
        _ => {}
    }
    true
}

/// Write one Opus frame to the outbound track, advancing the RTP clock.
///
/// Each frame covers 20ms; Opus over WebRTC always runs a 48kHz RTP clock
/// regardless of the capture rate.
fn write_audio_frame(
    rtc: &mut Rtc,
    mid: Mid,
    pt: Pt,
    clock_rate: Frequency,
    sample_offset: u64,
    frame: Bytes,
) -> u64 {
    const FRAME_DURATION_MS: u64 = 20;
    let ticks = clock_rate.get() as u64 * FRAME_DURATION_MS / 1000;

    let Some(writer) = rtc.writer(mid) else {
        warn!("audio writer not available, dropping frame");
        return sample_offset;
    };
    let rtp_time = MediaTime::new(sample_offset, clock_rate);
    if let Err(e) = writer.write(pt, Instant::now(), rtp_time, frame.to_vec()) {
        warn!("audio track write failed: {e}");
        return sample_offset;
    }
    sample_offset + ticks
}

/// Exchange the local SDP offer for the remote answer.
///
/// POST to the realtime endpoint parameterized by model id, with the
/// short-lived credential as bearer authorization and the offer as an
/// `application/sdp` body. The answer may come back as raw SDP or as JSON
/// with an `sdp` field; both are handled.
async fn exchange_sdp(
    signaling_base: &str,
    model: &str,
    ephemeral_key: &str,
    offer_sdp: String,
) -> Result<String> {
    let url = format!("{signaling_base}?model={model}");

    let response = reqwest::Client::new()
        .post(&url)
        .header("Authorization", format!("Bearer {ephemeral_key}"))
        .header("Content-Type", "application/sdp")
        .body(offer_sdp)
        .send()
        .await
        .map_err(|e| RealtimeError::negotiation(format!("SDP exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RealtimeError::negotiation(format!(
            "SDP exchange failed with status {status}: {body}"
        )));
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = response
        .text()
        .await
        .map_err(|e| RealtimeError::negotiation(format!("reading SDP answer: {e}")))?;

    if content_type.contains("application/json") {
        #[derive(serde::Deserialize)]
        struct SdpExchangeResponse {
            sdp: String,
        }
        let parsed: SdpExchangeResponse = serde_json::from_str(&body)
            .map_err(|e| RealtimeError::negotiation(format!("parsing SDP answer JSON: {e}")))?;
        Ok(parsed.sdp)
    } else {
        Ok(body)
    }
}
