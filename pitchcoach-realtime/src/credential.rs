//! Short-lived credential fetch from the relay.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{RealtimeError, Result};

/// A short-lived session credential minted by the relay.
///
/// Consumed once to open one realtime session; expiry is governed upstream
/// and not tracked locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Single-session authorization token.
    pub ephemeral_key: String,
    /// Model the session was minted for.
    pub model: String,
}

/// HTTP client for the relay's token endpoint.
#[derive(Debug, Clone)]
pub struct CredentialClient {
    http: reqwest::Client,
    token_url: Url,
}

impl CredentialClient {
    /// Create a client for the relay at `base_url` (e.g. `http://localhost:3000`).
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| RealtimeError::credential(format!("invalid relay URL: {e}")))?;
        let token_url = base
            .join("/api/token")
            .map_err(|e| RealtimeError::credential(format!("invalid relay URL: {e}")))?;
        Ok(Self { http: reqwest::Client::new(), token_url })
    }

    /// Fetch a fresh credential.
    ///
    /// Relay error bodies are surfaced verbatim in the error message so they
    /// end up in the activity log for debugging. No retry is attempted.
    pub async fn fetch(&self) -> Result<Credential> {
        let response = self
            .http
            .get(self.token_url.clone())
            .send()
            .await
            .map_err(|e| RealtimeError::credential(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RealtimeError::credential(format!(
                "relay returned {status}: {body}"
            )));
        }

        response
            .json::<Credential>()
            .await
            .map_err(|e| RealtimeError::credential(format!("invalid token response: {e}")))
    }
}
