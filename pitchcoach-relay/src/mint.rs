//! Upstream session minting.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::RelayConfig;
use crate::error::RelayError;

/// What the relay hands back to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Short-lived, single-session credential.
    pub ephemeral_key: String,
    /// Model the session was minted for.
    pub model: String,
}

/// Mint a short-lived session credential upstream.
///
/// POSTs the fixed session configuration with the long-lived secret as
/// bearer authorization and extracts the nested `client_secret.value` from
/// the response. Stateless: one outbound call, nothing retained.
pub async fn mint_session(
    http: &reqwest::Client,
    config: &RelayConfig,
) -> Result<TokenResponse, RelayError> {
    let api_key = config.api_key.as_ref().ok_or(RelayError::MissingApiKey)?;

    let response = http
        .post(&config.mint_url)
        .bearer_auth(api_key.expose_secret())
        .json(&json!({
            "model": config.model,
            "voice": config.voice,
            "instructions": config.instructions,
            "input_audio_transcription": { "model": config.transcription_model },
            "turn_detection": { "type": "server_vad" },
        }))
        .send()
        .await
        .map_err(|e| RelayError::Upstream(e.to_string()))?;

    let status = response.status();
    let body: Value =
        response.json().await.map_err(|e| RelayError::Upstream(e.to_string()))?;

    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "upstream mint rejected");
        return Err(RelayError::UpstreamMint { status: status.as_u16(), details: body });
    }

    let ephemeral_key = body
        .pointer("/client_secret/value")
        .and_then(Value::as_str)
        .ok_or_else(|| RelayError::Internal("mint response missing client_secret".to_string()))?
        .to_string();
    let model =
        body.get("model").and_then(Value::as_str).unwrap_or(&config.model).to_string();

    Ok(TokenResponse { ephemeral_key, model })
}
