// ── Core error types ──
//
// User-facing errors from bluelink-core. Consumers never see raw HTTP
// or JSON failures; the `From<bluelink_api::Error>` impl translates
// transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Vehicle discovery failed: {message}")]
    DiscoveryFailed { message: String },

    #[error("Not authenticated -- log in before sending vehicle commands")]
    NotAuthenticated,

    // ── Transport errors ─────────────────────────────────────────────
    #[error("Gateway returned HTTP {status}: {message}")]
    Transport { status: u16, message: String },

    #[error("Cannot reach gateway at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Gateway request timed out")]
    Timeout,

    // ── Command errors ───────────────────────────────────────────────
    #[error("Vehicle rejected {service}: {message}")]
    CommandFailed { service: String, message: String },

    // ── Input / configuration errors ─────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` if the gateway rejected the session; the identity
    /// is gone and the caller must log in again.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<bluelink_api::Error> for CoreError {
    fn from(err: bluelink_api::Error) -> Self {
        match err {
            bluelink_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            bluelink_api::Error::Status { status: 401, body } => {
                CoreError::AuthenticationFailed { message: body }
            }
            bluelink_api::Error::Status { status, body } => CoreError::Transport {
                status,
                message: body,
            },
            bluelink_api::Error::Http(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if let Some(status) = e.status() {
                    CoreError::Transport {
                        status: status.as_u16(),
                        message: e.to_string(),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            bluelink_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            bluelink_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            bluelink_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            bluelink_api::Error::MissingField(field) => CoreError::Config {
                message: format!("gateway dialect needs '{field}'"),
            },
        }
    }
}
