//! Tests for control-channel event wire shapes.

use pitchcoach_realtime::{ClientEvent, Scenario, ServerEvent, SessionConfig};

#[test]
fn session_update_serializes_with_wire_discriminator() {
    let event = ClientEvent::SessionUpdate {
        session: SessionConfig::for_scenario(Scenario::LandscapingQuote),
    };

    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["type"], "session.update");
    assert_eq!(value["session"]["voice"], "verse");
    assert_eq!(value["session"]["modalities"], serde_json::json!(["audio", "text"]));
    assert_eq!(value["session"]["input_audio_transcription"]["model"], "gpt-4o-transcribe");
    assert_eq!(value["session"]["turn_detection"]["type"], "server_vad");
    assert_eq!(
        value["session"]["instructions"],
        "Act as a customer unhappy with a landscaping quote."
    );
}

#[test]
fn default_session_config_omits_instructions() {
    let value = serde_json::to_value(SessionConfig::default()).unwrap();
    assert!(value.get("instructions").is_none());
}

#[test]
fn text_delta_deserializes() {
    let event =
        ServerEvent::parse(r#"{"type":"response.output_text.delta","delta":"hi"}"#).unwrap();
    assert_eq!(event, ServerEvent::TextDelta { delta: "hi".to_string() });
}

#[test]
fn transcript_completed_deserializes() {
    let event = ServerEvent::parse(
        r#"{"type":"conversation.item.input_audio_transcription.completed","transcript":"hello","item_id":"item_1"}"#,
    )
    .unwrap();
    assert_eq!(event, ServerEvent::TranscriptCompleted { transcript: "hello".to_string() });
}

#[test]
fn response_completed_deserializes() {
    let event = ServerEvent::parse(r#"{"type":"response.completed"}"#).unwrap();
    assert_eq!(event, ServerEvent::ResponseCompleted);
}

#[test]
fn unknown_types_map_to_unknown() {
    let event = ServerEvent::parse(r#"{"type":"session.created","session":{}}"#).unwrap();
    assert_eq!(event, ServerEvent::Unknown);
}

#[test]
fn malformed_json_parses_to_none() {
    assert!(ServerEvent::parse("{oops").is_none());
    assert!(ServerEvent::parse("").is_none());
    assert!(ServerEvent::parse("42").is_none());
}

#[test]
fn every_scenario_has_instructions() {
    for scenario in Scenario::ALL {
        assert!(!scenario.instructions().is_empty());
        assert_eq!(scenario.id().parse::<Scenario>().unwrap(), *scenario);
    }
}
