// ── Runtime connection configuration ──
//
// These types describe *how* to reach the gateway. They carry no
// credentials and never touch disk: the CLI (or any other consumer)
// builds a `BlueLinkConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use bluelink_api::{ActionEncoding, Dialect, Endpoints};
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Additional CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (debugging proxies only).
    DangerAcceptInvalid,
}

/// Configuration for talking to one gateway in one dialect.
#[derive(Debug, Clone)]
pub struct BlueLinkConfig {
    /// Gateway root (e.g. `https://api.telematics.hyundaiusa.com`).
    pub base_url: Url,
    /// Which protocol flavour to speak.
    pub dialect: Dialect,
    /// Endpoint paths, relative to `base_url`.
    pub endpoints: Endpoints,
    /// Forces one remote-action body encoding; `None` keeps the
    /// per-action default of the dialect.
    pub encoding: Option<ActionEncoding>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl BlueLinkConfig {
    /// Stock configuration for a dialect: its default host and endpoint
    /// table.
    pub fn for_dialect(dialect: Dialect) -> Result<Self, CoreError> {
        let base_url = Url::parse(dialect.default_base_url()).map_err(|e| CoreError::Config {
            message: format!("invalid default gateway URL: {e}"),
        })?;
        Ok(Self {
            base_url,
            dialect,
            endpoints: Endpoints::for_dialect(dialect),
            encoding: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        })
    }

    /// Point the configuration at a different gateway root.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }
}
