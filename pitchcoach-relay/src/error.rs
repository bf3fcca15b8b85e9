//! Relay error taxonomy and HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use thiserror::Error;

/// Errors the relay can return to a caller.
///
/// Every variant maps to a structured JSON body `{ "error": ..,
/// "details": .. }`. The long-lived upstream secret must never appear in
/// any of these — upstream diagnostic payloads are safe to surface because
/// they only ever reference the short-lived credential.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The request used a method other than GET.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// The server has no upstream secret configured.
    #[error("OPENAI_API_KEY is not set on the server")]
    MissingApiKey,

    /// The upstream mint endpoint returned a non-success status.
    #[error("failed to create session")]
    UpstreamMint {
        /// HTTP status the upstream returned.
        status: u16,
        /// Upstream diagnostic payload, surfaced verbatim for debugging.
        details: Value,
    },

    /// The upstream call itself failed (network, TLS, malformed body).
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// Anything unexpected. Reported without internals.
    #[error("unexpected error")]
    Internal(String),
}

impl RelayError {
    fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::UpstreamMint { .. } | RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        if let RelayError::Internal(detail) = &self {
            // Logged, not returned.
            tracing::error!(%detail, "internal relay error");
        }
        let status = self.status();
        let body = match &self {
            RelayError::UpstreamMint { details, .. } => {
                json!({ "error": self.to_string(), "details": details })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
