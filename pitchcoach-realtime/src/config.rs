//! Session configuration and scenario presets.

use serde::{Deserialize, Serialize};

/// Voice Activity Detection mode.
///
/// Turn-taking is decided upstream once audio is flowing; the client's
/// push-to-talk gate only controls whether audio flows at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VadMode {
    /// Server-side VAD (the only mode the training sessions use).
    #[default]
    ServerVad,
}

/// Turn-detection configuration sent in `session.update`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TurnDetection {
    /// VAD mode to use.
    #[serde(rename = "type")]
    pub mode: VadMode,
}

/// Input-audio transcription configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Transcription model to use.
    pub model: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self { model: "gpt-4o-transcribe".to_string() }
    }
}

/// Training scenario selecting a fixed instruction preset.
///
/// The scenario is a client-side choice: it travels to the model inside the
/// `session.update` configuration message, not through the credential relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
    /// Friendly open-ended conversation.
    #[default]
    Default,
    /// Customer complaining about service.
    AngryCustomer,
    /// Curious customer evaluating a product.
    SalesPitch,
    /// Customer pushing back on price.
    PriceResistance,
    /// Customer reporting a service issue.
    ServiceComplaint,
    /// Customer unhappy with a landscaping quote.
    LandscapingQuote,
}

impl Scenario {
    /// All selectable scenarios, in menu order.
    pub const ALL: &'static [Scenario] = &[
        Scenario::Default,
        Scenario::AngryCustomer,
        Scenario::SalesPitch,
        Scenario::PriceResistance,
        Scenario::ServiceComplaint,
        Scenario::LandscapingQuote,
    ];

    /// The system instructions for this scenario.
    pub fn instructions(self) -> &'static str {
        match self {
            Scenario::Default => "You are a friendly conversational AI.",
            Scenario::AngryCustomer => "Act as an angry customer complaining about service.",
            Scenario::SalesPitch => "Act as a curious customer evaluating a product.",
            Scenario::PriceResistance => "Act as a customer pushing back on price.",
            Scenario::ServiceComplaint => "Act as a customer reporting a service issue.",
            Scenario::LandscapingQuote => {
                "Act as a customer unhappy with a landscaping quote."
            }
        }
    }

    /// Stable identifier, usable as a selector value.
    pub fn id(self) -> &'static str {
        match self {
            Scenario::Default => "default",
            Scenario::AngryCustomer => "angry_customer",
            Scenario::SalesPitch => "sales_pitch",
            Scenario::PriceResistance => "price_resistance",
            Scenario::ServiceComplaint => "service_complaint",
            Scenario::LandscapingQuote => "landscaping_quote",
        }
    }
}

impl std::str::FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .iter()
            .copied()
            .find(|sc| sc.id() == s)
            .ok_or_else(|| format!("unknown scenario: {s}"))
    }
}

/// Configuration payload for the `session.update` control message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Output modalities.
    pub modalities: Vec<String>,

    /// Voice for audio output.
    pub voice: String,

    /// System instructions (scenario preset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// Input audio transcription settings.
    pub input_audio_transcription: TranscriptionConfig,

    /// Turn-detection settings.
    pub turn_detection: TurnDetection,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            modalities: vec!["audio".to_string(), "text".to_string()],
            voice: "verse".to_string(),
            instructions: None,
            input_audio_transcription: TranscriptionConfig::default(),
            turn_detection: TurnDetection::default(),
        }
    }
}

impl SessionConfig {
    /// Build the configuration for a scenario preset.
    pub fn for_scenario(scenario: Scenario) -> Self {
        Self::default().with_instructions(scenario.instructions())
    }

    /// Set the system instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Set the voice.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }
}
