use thiserror::Error;

/// Core error taxonomy surfaced to frontends.
///
/// Transport-level errors from `whes-api` are folded into a small set of
/// categories so callers can distinguish "wrong credentials" from "cloud
/// unreachable" from "unexpected payload" without inspecting reqwest.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection ──────────────────────────────────────────────────
    /// Could not reach the metrics endpoint at all.
    #[error("Connection to {url} failed: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// The cloud rejected the API key / secret pair.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// A metrics request exceeded the transport timeout.
    #[error("Metrics request timed out")]
    Timeout,

    // ── API ─────────────────────────────────────────────────────────
    /// The cloud answered with an error status or an unusable response.
    #[error("API error: {message}")]
    Api { message: String, status: Option<u16> },

    // ── Data ────────────────────────────────────────────────────────
    /// The response body did not match the expected wire shape.
    #[error("Failed to decode metrics payload: {message}")]
    Decode { message: String },

    // ── Configuration ───────────────────────────────────────────────
    /// Invalid monitor configuration (bad URL, empty identifiers).
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal ────────────────────────────────────────────────────
    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<whes_api::Error> for CoreError {
    fn from(err: whes_api::Error) -> Self {
        match err {
            whes_api::Error::Authentication { message, .. } => {
                Self::AuthenticationFailed { message }
            }
            whes_api::Error::Transport(e) => {
                if e.is_timeout() {
                    Self::Timeout
                } else if e.is_connect() || e.is_request() {
                    Self::ConnectionFailed {
                        url: e.url().map(ToString::to_string).unwrap_or_default(),
                        reason: e.to_string(),
                    }
                } else {
                    Self::Api {
                        status: e.status().map(|s| s.as_u16()),
                        message: e.to_string(),
                    }
                }
            }
            whes_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("invalid base URL: {e}"),
            },
            whes_api::Error::ClientBuild(message) => Self::Internal(message),
            whes_api::Error::Http { status, body } => Self::Api {
                status: Some(status),
                message: format!("HTTP {status}: {body}"),
            },
            decode @ whes_api::Error::Decode { .. } => Self::Decode {
                message: decode.to_string(),
            },
        }
    }
}

impl CoreError {
    /// Returns `true` when the failure is a credential rejection.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }

    /// Returns `true` for connectivity problems (unreachable, timeout).
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout)
    }
}
