//! Tests driving the connection state machine with synthetic events.

use pitchcoach_realtime::{
    ClientEvent, ConnectionState, Credential, RealtimeError, Role, Scenario, VoiceClient,
};

fn test_credential() -> Credential {
    Credential {
        ephemeral_key: "ek_test".to_string(),
        model: "gpt-4o-realtime-preview-2024-12-17".to_string(),
    }
}

/// Walk a fresh client to the connected state.
fn connected_client(scenario: Scenario) -> VoiceClient {
    let mut client = VoiceClient::new(scenario);
    assert!(client.begin_connect());
    client.credential_received(&test_credential());
    client.peer_connected();
    assert_eq!(client.state(), ConnectionState::Connected);
    client
}

#[test]
fn connect_walks_through_the_states() {
    let mut client = VoiceClient::new(Scenario::Default);
    assert_eq!(client.state(), ConnectionState::Idle);

    assert!(client.begin_connect());
    assert_eq!(client.state(), ConnectionState::RequestingCredential);

    client.credential_received(&test_credential());
    assert_eq!(client.state(), ConnectionState::Negotiating);

    client.peer_connected();
    assert_eq!(client.state(), ConnectionState::Connected);
}

#[test]
fn second_connect_is_rejected_while_one_is_outstanding() {
    let mut client = VoiceClient::new(Scenario::Default);
    assert!(client.begin_connect());
    assert!(!client.begin_connect());
    assert_eq!(client.state(), ConnectionState::RequestingCredential);
}

#[test]
fn connect_is_rejected_while_connected() {
    let mut client = connected_client(Scenario::Default);
    assert!(!client.begin_connect());
    assert_eq!(client.state(), ConnectionState::Connected);
    assert_eq!(client.log().last().unwrap().text, "Already connected.");
}

#[test]
fn failed_connect_allows_retry() {
    let mut client = VoiceClient::new(Scenario::Default);
    assert!(client.begin_connect());
    client.connect_failed(&RealtimeError::credential("relay returned 500"));
    assert_eq!(client.state(), ConnectionState::Failed);

    // The failure is surfaced in the activity log.
    assert!(client.log().last().unwrap().text.contains("relay returned 500"));

    // A fresh manual connect is accepted.
    assert!(client.begin_connect());
    assert_eq!(client.state(), ConnectionState::RequestingCredential);
}

#[test]
fn session_update_is_sent_exactly_once_and_only_after_open() {
    let mut client = VoiceClient::new(Scenario::AngryCustomer);
    client.begin_connect();
    client.credential_received(&test_credential());

    assert!(!client.session_update_sent());

    let first = client.channel_opened();
    let Some(ClientEvent::SessionUpdate { session }) = first else {
        panic!("expected session.update on first channel open");
    };
    assert_eq!(
        session.instructions.as_deref(),
        Some(Scenario::AngryCustomer.instructions())
    );
    assert!(client.session_update_sent());

    // A duplicate open event must not produce a second configuration message.
    assert!(client.channel_opened().is_none());
}

#[test]
fn session_update_flag_resets_for_the_next_session() {
    let mut client = connected_client(Scenario::Default);
    assert!(client.channel_opened().is_some());

    client.reset();
    client.begin_connect();
    client.credential_received(&test_credential());
    assert!(client.channel_opened().is_some());
}

#[test]
fn talking_is_a_noop_unless_connected() {
    let mut client = VoiceClient::new(Scenario::Default);
    assert!(!client.start_talking());
    assert_eq!(client.state(), ConnectionState::Idle);

    client.begin_connect();
    assert!(!client.start_talking());

    client.credential_received(&test_credential());
    assert!(!client.start_talking());
    assert!(!client.mic_enabled());
}

#[test]
fn push_to_talk_round_trips() {
    let mut client = connected_client(Scenario::Default);

    assert!(client.start_talking());
    assert_eq!(client.state(), ConnectionState::Talking);
    assert!(client.mic_enabled());

    // Starting again while already talking is a no-op.
    assert!(!client.start_talking());

    assert!(client.stop_talking());
    assert_eq!(client.state(), ConnectionState::Connected);
    assert!(!client.mic_enabled());

    // Stopping again is a no-op.
    assert!(!client.stop_talking());
}

#[test]
fn peer_loss_disables_the_gate() {
    let mut client = connected_client(Scenario::Default);
    client.start_talking();

    client.peer_disconnected();
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(!client.mic_enabled());
    assert!(!client.start_talking());
}

#[test]
fn transcript_event_appends_one_user_entry() {
    let mut client = connected_client(Scenario::Default);
    let before = client.log().len();

    client.handle_message(
        r#"{"type":"conversation.item.input_audio_transcription.completed","transcript":"hello"}"#,
    );

    assert_eq!(client.log().len(), before + 1);
    let entry = client.log().last().unwrap();
    assert_eq!(entry.role, Role::User);
    assert_eq!(entry.text, "hello");
}

#[test]
fn text_deltas_append_assistant_entries_in_order() {
    let mut client = connected_client(Scenario::Default);
    let before = client.log().len();

    client.handle_message(r#"{"type":"response.output_text.delta","delta":"Hi "}"#);
    client.handle_message(r#"{"type":"response.output_text.delta","delta":"there"}"#);

    let entries = &client.log().entries()[before..];
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.role == Role::Assistant));
    assert_eq!(entries[0].text, "Hi ");
    assert_eq!(entries[1].text, "there");
}

#[test]
fn response_completed_appends_a_system_marker() {
    let mut client = connected_client(Scenario::Default);
    client.handle_message(r#"{"type":"response.completed"}"#);
    assert_eq!(client.log().last().unwrap().role, Role::System);
}

#[test]
fn malformed_payloads_change_nothing() {
    let mut client = connected_client(Scenario::Default);
    let before = client.log().len();

    client.handle_message("not json at all");
    client.handle_message("{\"type\":");
    client.handle_message("");

    assert_eq!(client.log().len(), before);
    assert_eq!(client.state(), ConnectionState::Connected);
}

#[test]
fn unrecognized_event_kinds_are_ignored() {
    let mut client = connected_client(Scenario::Default);
    let before = client.log().len();

    client.handle_message(r#"{"type":"rate_limits.updated","rate_limits":[]}"#);
    client.handle_message(r#"{"type":"response.audio.delta","delta":"aGk="}"#);

    assert_eq!(client.log().len(), before);
}

#[test]
fn reset_is_idempotent() {
    let mut client = connected_client(Scenario::Default);
    client.start_talking();

    client.reset();
    assert_eq!(client.state(), ConnectionState::Idle);
    assert!(!client.mic_enabled());

    let log_len = client.log().len();
    client.reset();
    assert_eq!(client.state(), ConnectionState::Idle);
    // Second reset is a true no-op, including for the log.
    assert_eq!(client.log().len(), log_len);
}

#[test]
fn scenario_changes_only_apply_while_not_connected() {
    let mut client = VoiceClient::new(Scenario::Default);
    assert!(client.set_scenario(Scenario::PriceResistance));
    assert_eq!(client.scenario(), Scenario::PriceResistance);

    client.begin_connect();
    assert!(!client.set_scenario(Scenario::SalesPitch));
    assert_eq!(client.scenario(), Scenario::PriceResistance);
}

#[test]
fn happy_path_log_tells_the_whole_story() {
    let mut client = connected_client(Scenario::Default);
    client.channel_opened();
    client.start_talking();
    client.handle_message(
        r#"{"type":"conversation.item.input_audio_transcription.completed","transcript":"can you do better on price?"}"#,
    );
    client.stop_talking();
    client.handle_message(r#"{"type":"response.output_text.delta","delta":"Let me check."}"#);
    client.handle_message(r#"{"type":"response.completed"}"#);
    client.reset();

    let roles: Vec<Role> = client.log().entries().iter().map(|e| e.role).collect();
    // System narration bracketing one user turn and one assistant response.
    assert_eq!(roles.iter().filter(|r| **r == Role::User).count(), 1);
    assert_eq!(roles.iter().filter(|r| **r == Role::Assistant).count(), 1);
    assert_eq!(*roles.first().unwrap(), Role::System);
    assert_eq!(*roles.last().unwrap(), Role::System);
}
