//! CLI-side configuration: flag overrides on top of `bluelink-config`.
//!
//! Precedence for every setting is flag > env > profile > default.

use std::path::PathBuf;

use bluelink_config::{Config, Profile};
use bluelink_core::{BlueLinkConfig, ClimatePreset, Credentials, Dialect, TlsVerification};

use crate::cli::{DialectArg, GlobalOpts, PresetArg, SecretArg};
use crate::error::CliError;

// ── Loading ──────────────────────────────────────────────────────────

/// The config file in effect: `--config` or the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(bluelink_config::config_path)
}

pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(bluelink_config::load_config_from(&config_path(global))?)
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

// ── Profile resolution ───────────────────────────────────────────────

/// Build connection config and credentials for the active profile.
///
/// A profile named with `--profile` must exist. Without one, a missing
/// default profile falls back to env-only credentials.
pub fn resolve(global: &GlobalOpts) -> Result<(BlueLinkConfig, Credentials), CliError> {
    let mut cfg = load_config(global)?;
    let name = active_profile_name(global, &cfg);

    let selected = cfg.profiles.remove(&name);
    cfg.zeroize_secrets();

    let mut profile = match selected {
        Some(p) => p,
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => Profile::default(),
    };
    apply_overrides(&mut profile, global, cfg.defaults.timeout);

    tracing::debug!(profile = %name, dialect = %profile.dialect, "resolved profile");
    let resolved = bluelink_config::profile_to_config(&profile, &name);

    // Credentials own their copies now.
    profile.zeroize_secrets();
    Ok(resolved?)
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts, default_timeout: u64) {
    if let Some(dialect) = global.dialect {
        profile.dialect = dialect.into();
    }
    if let Some(ref base_url) = global.base_url {
        profile.base_url = Some(base_url.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    profile.timeout = Some(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(default_timeout),
    );
}

/// Connection-only view of a profile, for display.
pub fn describe(config: &BlueLinkConfig) -> Vec<(&'static str, String)> {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => "system".to_owned(),
        TlsVerification::CustomCa(path) => format!("ca: {}", path.display()),
        TlsVerification::DangerAcceptInvalid => "insecure".to_owned(),
    };
    vec![
        ("Dialect", config.dialect.to_string()),
        ("Gateway", config.base_url.to_string()),
        (
            "Encoding",
            config
                .encoding
                .map_or_else(|| "per action".to_owned(), |e| e.to_string()),
        ),
        ("TLS", tls),
        ("Timeout", format!("{}s", config.timeout.as_secs())),
    ]
}

// ── Flag → domain conversions ────────────────────────────────────────

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Token => Dialect::Token,
            DialectArg::Session => Dialect::Session,
        }
    }
}

impl From<PresetArg> for ClimatePreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Winter => ClimatePreset::Winter,
            PresetArg::Winter2 => ClimatePreset::Winter2,
            PresetArg::Summer => ClimatePreset::Summer,
        }
    }
}

impl From<SecretArg> for bluelink_config::SecretKind {
    fn from(arg: SecretArg) -> Self {
        match arg {
            SecretArg::Password => Self::Password,
            SecretArg::Pin => Self::Pin,
            SecretArg::ClientSecret => Self::ClientSecret,
        }
    }
}
