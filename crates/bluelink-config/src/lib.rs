//! Shared configuration for Blue Link tools.
//!
//! TOML (or JSON) profiles, secret resolution (env + keyring + plaintext),
//! and translation to `bluelink_core::BlueLinkConfig` plus `Credentials`.
//! The CLI layers its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bluelink_core::{ActionEncoding, BlueLinkConfig, Credentials, Dialect, TlsVerification};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use secrecy::SecretString;
use secrecy::zeroize::Zeroize;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display};
use thiserror::Error;
use tracing::debug;

/// Keyring service name secrets are stored under.
pub const KEYRING_SERVICE: &str = "bluelink";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}' (missing {missing})")]
    NoCredentials { profile: String, missing: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config structs ──────────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named account profile.
///
/// The camelCase aliases let a flat `config.json` of `username`,
/// `password`, `pin`, `vin`, `clientId`, `clientSecret` load as-is.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Profile {
    /// Protocol flavour: "token" or "session".
    pub dialect: Dialect,

    /// Gateway root; defaults to the dialect's host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Remote-action body encoding override: "json" or "form".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<ActionEncoding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Account password (plaintext -- prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Blue Link service PIN (plaintext -- prefer keyring or env var).
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opt_string_or_number"
    )]
    pub pin: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,

    /// API client id (token dialect).
    #[serde(alias = "clientId", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// API client secret (token dialect; plaintext -- prefer keyring).
    #[serde(alias = "clientSecret", skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Path to an extra CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Per-request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Endpoint path overrides.
    #[serde(skip_serializing_if = "EndpointOverrides::is_empty")]
    pub endpoints: EndpointOverrides,
}

impl Profile {
    /// Wipe and clear the plaintext password, PIN and client secret.
    ///
    /// Call once the profile has been turned into `Credentials`, which
    /// hold their own zeroizing copies.
    pub fn zeroize_secrets(&mut self) {
        for secret in [&mut self.password, &mut self.pin, &mut self.client_secret] {
            if let Some(value) = secret.as_mut() {
                value.zeroize();
            }
            *secret = None;
        }
    }
}

impl Config {
    /// [`Profile::zeroize_secrets`] for every profile.
    pub fn zeroize_secrets(&mut self) {
        for profile in self.profiles.values_mut() {
            profile.zeroize_secrets();
        }
    }
}

/// Per-endpoint path overrides; unset entries keep the dialect default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf_validate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlock: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub find: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logout: Option<String>,
}

impl EndpointOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, endpoints: &mut bluelink_core::Endpoints) {
        fn set(target: &mut String, value: Option<&String>) {
            if let Some(v) = value {
                target.clone_from(v);
            }
        }
        fn set_opt(target: &mut Option<String>, value: Option<&String>) {
            if let Some(v) = value {
                *target = Some(v.clone());
            }
        }

        set(&mut endpoints.login, self.login.as_ref());
        set_opt(&mut endpoints.csrf, self.csrf.as_ref());
        set_opt(&mut endpoints.csrf_validate, self.csrf_validate.as_ref());
        set(&mut endpoints.enrollment, self.enrollment.as_ref());
        set(&mut endpoints.lock, self.lock.as_ref());
        set(&mut endpoints.unlock, self.unlock.as_ref());
        set(&mut endpoints.start, self.start.as_ref());
        set(&mut endpoints.stop, self.stop.as_ref());
        set(&mut endpoints.find, self.find.as_ref());
        set_opt(&mut endpoints.logout, self.logout.as_ref());
    }
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }
    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "bluelink", "bluelink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("bluelink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from an explicit file + environment.
///
/// `.json` files are read as JSON. A JSON object without a `profiles`
/// key is taken as a single flat profile named `default`. A missing file
/// yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading configuration");
    let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

    if is_json(path) {
        if path.exists() {
            let text = std::fs::read_to_string(path)?;
            let value: serde_json::Value =
                serde_json::from_str(&text).map_err(|e| ConfigError::Validation {
                    field: path.display().to_string(),
                    reason: format!("invalid JSON: {e}"),
                })?;
            figment = if value.get("profiles").is_some() {
                figment.merge(Json::string(&text))
            } else {
                figment.merge(Serialized::defaults(serde_json::json!({
                    "profiles": { "default": value }
                })))
            };
        }
    } else {
        figment = figment.merge(Toml::file(path));
    }

    let config: Config = figment
        .merge(Env::prefixed("BLUELINK_").split("__"))
        .extract()?;
    Ok(config)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Secret resolution ───────────────────────────────────────────────

/// Secrets a profile can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum SecretKind {
    Password,
    Pin,
    ClientSecret,
}

impl SecretKind {
    /// Environment variable consulted first.
    pub fn env_var(self) -> &'static str {
        match self {
            Self::Password => "BLUELINK_PASSWORD",
            Self::Pin => "BLUELINK_PIN",
            Self::ClientSecret => "BLUELINK_CLIENT_SECRET",
        }
    }

    /// Keyring account name for a profile: `<profile>/<secret>`.
    pub fn keyring_account(self, profile_name: &str) -> String {
        format!("{profile_name}/{}", self.as_ref())
    }

    fn plaintext(self, profile: &Profile) -> Option<&String> {
        match self {
            Self::Password => profile.password.as_ref(),
            Self::Pin => profile.pin.as_ref(),
            Self::ClientSecret => profile.client_secret.as_ref(),
        }
    }
}

/// Resolve a secret: env var → system keyring → plaintext in the profile.
pub fn resolve_secret(
    profile: &Profile,
    profile_name: &str,
    kind: SecretKind,
) -> Option<SecretString> {
    // 1. Env var
    if let Ok(val) = std::env::var(kind.env_var()) {
        if !val.is_empty() {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_account(profile_name)) {
        if let Ok(secret) = entry.get_password() {
            debug!(secret = %kind, "secret read from keyring");
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    kind.plaintext(profile).map(|s| SecretString::from(s.clone()))
}

/// Store a secret in the system keyring.
pub fn store_secret(
    profile_name: &str,
    kind: SecretKind,
    value: &str,
) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_account(profile_name))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })?;
    entry
        .set_password(value)
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

// ── Profile translation ─────────────────────────────────────────────

/// Build connection config and credentials from a profile.
pub fn profile_to_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<(BlueLinkConfig, Credentials), ConfigError> {
    profile_to_config_with(profile, profile_name, |kind| {
        resolve_secret(profile, profile_name, kind)
    })
}

/// Like [`profile_to_config`], with a caller-supplied secret lookup.
pub fn profile_to_config_with<F>(
    profile: &Profile,
    profile_name: &str,
    secret: F,
) -> Result<(BlueLinkConfig, Credentials), ConfigError>
where
    F: Fn(SecretKind) -> Option<SecretString>,
{
    let config = connection_config(profile)?;

    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("BLUELINK_USERNAME").ok());
    let vin = profile
        .vin
        .clone()
        .or_else(|| std::env::var("BLUELINK_VIN").ok());
    // Identity fields first, so an unconfigured profile never reaches the keyring.
    let mut missing = Vec::new();
    if username.is_none() {
        missing.push("username");
    }
    if vin.is_none() {
        missing.push("vin");
    }
    if !missing.is_empty() {
        return Err(ConfigError::NoCredentials {
            profile: profile_name.into(),
            missing: missing.join(", "),
        });
    }

    let password = secret(SecretKind::Password);
    let pin = secret(SecretKind::Pin);
    if password.is_none() {
        missing.push("password");
    }
    if pin.is_none() {
        missing.push("pin");
    }
    let (Some(username), Some(password), Some(pin), Some(vin)) = (username, password, pin, vin)
    else {
        return Err(ConfigError::NoCredentials {
            profile: profile_name.into(),
            missing: missing.join(", "),
        });
    };

    let mut credentials = Credentials::new(username, password, pin, vin);
    let client_id = profile
        .client_id
        .clone()
        .or_else(|| std::env::var("BLUELINK_CLIENT_ID").ok());
    if let (Some(id), Some(client_secret)) = (client_id, secret(SecretKind::ClientSecret)) {
        credentials = credentials.with_api_client(id, client_secret);
    }

    Ok((config, credentials))
}

/// The connection half of a profile: host, dialect, endpoints, TLS.
pub fn connection_config(profile: &Profile) -> Result<BlueLinkConfig, ConfigError> {
    let mut config =
        BlueLinkConfig::for_dialect(profile.dialect).map_err(|e| ConfigError::Validation {
            field: "dialect".into(),
            reason: e.to_string(),
        })?;

    if let Some(ref base) = profile.base_url {
        let url: url::Url = base.parse().map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {base}"),
        })?;
        config = config.with_base_url(url);
    }
    if let Some(encoding) = profile.encoding {
        config.encoding = Some(encoding);
    }
    profile.endpoints.apply(&mut config.endpoints);

    config.tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };
    if let Some(secs) = profile.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    Ok(config)
}
