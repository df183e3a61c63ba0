use thiserror::Error;

/// Top-level error type for the `bluelink-api` crate.
///
/// Covers every failure mode of the gateway client: authentication,
/// transport, HTTP status, and payload decoding. `bluelink-core` maps
/// these into the user-facing taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Credentials or token rejected by the gateway.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The active dialect needs an endpoint that isn't configured.
    #[error("Endpoint '{0}' is not configured for this dialect")]
    MissingField(&'static str),
}

impl Error {
    /// Returns `true` if the gateway rejected our token or credentials.
    pub fn is_auth_rejection(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::Status { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// Build a `Status` error, trimming the body to a readable preview.
    pub(crate) fn status(status: reqwest::StatusCode, body: &str) -> Self {
        Self::Status {
            status: status.as_u16(),
            body: preview(body).to_owned(),
        }
    }
}

/// First 200 bytes of a response body, cut on a char boundary.
pub(crate) fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
