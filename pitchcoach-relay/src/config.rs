//! Relay configuration.

use secrecy::SecretString;

/// Upstream endpoint that mints short-lived session credentials.
pub const DEFAULT_MINT_URL: &str = "https://api.openai.com/v1/realtime/sessions";

/// Default realtime model a session is minted for.
pub const DEFAULT_MODEL: &str = "gpt-4o-realtime-preview-2024-12-17";

/// Fixed session parameters and server settings for the relay.
///
/// Everything about the minted session is fixed server-side; the scenario
/// instructions the trainee picks travel over the client's control channel,
/// not through the relay.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Long-lived upstream secret. `None` means misconfigured: the server
    /// still starts, and `/api/token` fails per request.
    pub api_key: Option<SecretString>,
    /// Upstream mint endpoint URL (overridable for tests).
    pub mint_url: String,
    /// Model to mint sessions for.
    pub model: String,
    /// Voice for audio output.
    pub voice: String,
    /// Baseline system instructions.
    pub instructions: String,
    /// Input-audio transcription model.
    pub transcription_model: String,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            mint_url: DEFAULT_MINT_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            voice: "verse".to_string(),
            instructions: "You are a friendly sales-training voice assistant. \
                           Keep responses short and conversational."
                .to_string(),
            transcription_model: "gpt-4o-transcribe".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl RelayConfig {
    /// Build the configuration from the environment.
    ///
    /// `OPENAI_API_KEY` supplies the upstream secret; `PITCHCOACH_BIND`
    /// optionally overrides the bind address.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.api_key = std::env::var("OPENAI_API_KEY").ok().map(SecretString::from);
        if let Ok(bind) = std::env::var("PITCHCOACH_BIND") {
            config.bind_addr = bind;
        }
        config
    }

    /// Set the upstream secret.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Override the upstream mint endpoint.
    pub fn with_mint_url(mut self, url: impl Into<String>) -> Self {
        self.mint_url = url.into();
        self
    }

    /// Override the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}
